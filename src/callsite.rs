//! Recovery of the name a call's result is bound to.
//!
//! A helper that names a build target after the variable it is assigned
//! to needs to see its own call site. Instead of inspecting the stack at
//! run time, [callsite!] reifies the assignment as written into a
//! [CallSite] value at compile time, and [assigned_target] decodes that
//! description, accepting exactly the stores to a single possibly
//! dotted name and rejecting every other statement shape.

use std::fmt;

use crate::error::{UtilError, UtilResult};

/// One operation pending at a call's return site
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
  /// Push the value bound to a name, the receiver of an attribute store
  LoadName(String),
  /// Store the top of stack into a simple name
  StoreName(String),
  /// Store the top of stack into an attribute of the loaded receiver
  StoreAttr(String),
  /// Split the top of stack across this many targets
  Unpack(usize),
  /// Drop the value; the statement discards its result
  Discard,
}
impl fmt::Display for Op {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Op::LoadName(name) => write!(f, "a load of {name}"),
      Op::StoreName(name) => write!(f, "a store to {name}"),
      Op::StoreAttr(attr) => write!(f, "a store to attribute {attr}"),
      Op::Unpack(n) => write!(f, "an unpacking into {n} targets"),
      Op::Discard => write!(f, "a discard"),
    }
  }
}

/// A snapshot of the operations pending at a call's return site, in
/// execution order. Built by [callsite!] where the call is written;
/// plain data with no live connection to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite(Vec<Op>);
impl CallSite {
  /// Describe a call site by its pending operations
  pub fn new(ops: impl IntoIterator<Item = Op>) -> Self { Self(ops.into_iter().collect()) }

  /// The pending operations in execution order
  pub fn ops(&self) -> &[Op] { &self.0 }
}

/// A well-formed single assignment target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
  /// A simple name, like `var`
  Name(String),
  /// A single-level attribute of a named receiver, like `obj.bar`
  Attr {
    /// The name the receiver is bound to
    recv: String,
    /// The attribute stored into
    attr: String,
  },
}
impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Target::Name(name) => write!(f, "{name}"),
      Target::Attr { recv, attr } => write!(f, "{recv}.{attr}"),
    }
  }
}

/// Error produced when the operations pending at a call site do not
/// store the call's result to a single target. Carries the operation
/// that made the site unsupported, if there was one at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotAnAssignment(pub Option<Op>);
impl UtilError for NotAnAssignment {
  const DESCRIPTION: &'static str = "the call result is not stored to a single target";
  fn message(&self) -> String {
    match &self.0 {
      Some(op) => format!("{}; the next pending operation is {}", Self::DESCRIPTION, op),
      None => format!("{}; nothing is pending at the call site", Self::DESCRIPTION),
    }
  }
}

/// The single target the pending operations store the call's result to.
/// Exactly two head shapes are accepted: a store to a simple name and a
/// store to an attribute of a named receiver. Anything past the head is
/// the rest of the caller's statement and is ignored. Unpacking
/// assignments and discarded results bind no single name and are
/// rejected with [NotAnAssignment].
pub fn assigned_target(site: &CallSite) -> UtilResult<Target> {
  match site.ops() {
    [Op::StoreName(name), ..] => Ok(Target::Name(name.clone())),
    [Op::LoadName(recv), Op::StoreAttr(attr), ..] =>
      Ok(Target::Attr { recv: recv.clone(), attr: attr.clone() }),
    ops => Err(NotAnAssignment(ops.first().cloned()).pack()),
  }
}

/// The dotted rendering of [assigned_target], `var` or `obj.bar`
pub fn get_assigned_name(site: &CallSite) -> UtilResult<String> {
  Ok(assigned_target(site)?.to_string())
}

/// Describes an assignment as a [CallSite], in place of the runtime
/// stack inspection other languages would use.
///
/// - `callsite!(let var)` is a store to the name `var`
/// - `callsite!(obj.bar)` is a store to the attribute `bar` of `obj`
/// - `callsite!(let (x, y))` is an unpacking assignment
/// - `callsite!()` is a statement that discards the result
///
/// ```
/// let site = craftr_utils::callsite!(let name);
/// assert_eq!(craftr_utils::callsite::get_assigned_name(&site).unwrap(), "name");
/// ```
#[macro_export]
macro_rules! callsite {
  () => {
    $crate::callsite::CallSite::new([$crate::callsite::Op::Discard])
  };
  (let ($($target:ident),+ $(,)?)) => {
    $crate::callsite::CallSite::new([
      $crate::callsite::Op::Unpack([$(stringify!($target)),+].len()),
      $($crate::callsite::Op::StoreName(stringify!($target).to_string())),+
    ])
  };
  (let $target:ident) => {
    $crate::callsite::CallSite::new([$crate::callsite::Op::StoreName(
      stringify!($target).to_string(),
    )])
  };
  ($recv:ident . $attr:ident) => {
    $crate::callsite::CallSite::new([
      $crate::callsite::Op::LoadName(stringify!($recv).to_string()),
      $crate::callsite::Op::StoreAttr(stringify!($attr).to_string()),
    ])
  };
}
