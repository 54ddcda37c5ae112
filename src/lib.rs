#![warn(missing_docs)]
//! Shared pure helpers for the Craftr build system: path-string
//! manipulation over an explicitly injected path convention, flattening
//! of arbitrarily nested value groups into flat lists, and recovery of
//! the name a call's result is being assigned to.
pub mod callsite;
pub mod error;
pub mod lists;
pub mod path;
