//! Abstractions for handling the failure conditions of the helpers under
//! a common trait object.

use core::fmt;
use std::any::Any;
use std::fmt::{Debug, Display};

use dyn_clone::{clone_box, DynClone};

/// A trait for concrete error conditions raised by the helpers in this
/// crate. Do not depend on this trait, refer to [DynUtilError] instead.
pub trait UtilError: Clone + Sized + Send + Sync + 'static {
  /// General description of the error condition
  const DESCRIPTION: &'static str;
  /// Specific description of the error including concrete data if possible
  fn message(&self) -> String { Self::DESCRIPTION.to_string() }
  /// Convert the error to a type-erased structure for handling on shared
  /// channels
  fn pack(self) -> UtilErrorObj { Box::new(self) }
}

/// Object-safe equivalent to [UtilError]. Implement that one instead of
/// this.
pub trait DynUtilError: Any + Send + Sync + DynClone {
  /// Allow to downcast the base object to distinguish between various
  /// errors. This is how callers that can recover from a particular
  /// condition recognize it.
  fn as_any_ref(&self) -> &dyn Any;
  /// Generic description of the error condition
  fn description(&self) -> &str;
  /// Specific description of this particular error
  fn message(&self) -> String;
}

/// Type-erased [UtilError] implementor through the object-trait
/// [DynUtilError]
pub type UtilErrorObj = Box<dyn DynUtilError>;
/// The result of any fallible helper in this crate
pub type UtilResult<T> = Result<T, UtilErrorObj>;

impl<T: UtilError + 'static> DynUtilError for T {
  fn description(&self) -> &str { Self::DESCRIPTION }
  fn message(&self) -> String { self.message() }
  fn as_any_ref(&self) -> &dyn Any { self }
}
impl Clone for UtilErrorObj {
  fn clone(&self) -> Self { clone_box(&**self) }
}
impl DynUtilError for UtilErrorObj {
  fn description(&self) -> &str { (**self).description() }
  fn message(&self) -> String { (**self).message() }
  fn as_any_ref(&self) -> &dyn Any { (**self).as_any_ref() }
}
impl Display for UtilErrorObj {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.message())
  }
}
impl Debug for UtilErrorObj {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{self}")
  }
}
