//! Flattening of arbitrarily nested value groups.
//!
//! Build scripts pass sources around as single strings, lists, tuples,
//! sets, or any mix of these nested to any depth. [Nested] is that tree
//! shape, [nested!] a literal syntax for it, and [autoexpand] reduces a
//! tree to the flat list the build actually consumes.

use std::hash::Hash;

use hashbrown::HashSet;
use trait_set::trait_set;

trait_set! {
  /// Everything a flattenable scalar must support. Sets hold scalars
  /// directly, so equality and hashing are required of all of them.
  pub trait Leaf = Clone + Eq + Hash;
}

/// A value in a group tree: either a single scalar or a container of
/// further trees. A string counts as one scalar no matter how it would
/// iterate; flattening never explodes it into characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Nested<T: Leaf> {
  /// A single value
  Scalar(T),
  /// An ordered group that can grow
  List(Vec<Nested<T>>),
  /// An ordered group of fixed shape
  Tuple(Vec<Nested<T>>),
  /// An unordered group of distinct scalars
  Set(HashSet<T>),
}
impl<T: Leaf> Nested<T> {
  /// Group a sequence of trees as a list
  pub fn list(items: impl IntoIterator<Item = impl Into<Nested<T>>>) -> Self {
    Nested::List(items.into_iter().map(|i| i.into()).collect())
  }

  /// Group a sequence of trees as a tuple
  pub fn tuple(items: impl IntoIterator<Item = impl Into<Nested<T>>>) -> Self {
    Nested::Tuple(items.into_iter().map(|i| i.into()).collect())
  }

  /// Group scalars as a set. Duplicates collapse.
  pub fn set(items: impl IntoIterator<Item = T>) -> Self {
    Nested::Set(items.into_iter().collect())
  }
}
impl<T: Leaf> From<T> for Nested<T> {
  fn from(value: T) -> Self { Nested::Scalar(value) }
}
impl From<&str> for Nested<String> {
  fn from(value: &str) -> Self { Nested::Scalar(value.to_string()) }
}
impl<T: Leaf> From<Vec<Nested<T>>> for Nested<T> {
  fn from(value: Vec<Nested<T>>) -> Self { Nested::List(value) }
}
impl<T: Leaf> From<HashSet<T>> for Nested<T> {
  fn from(value: HashSet<T>) -> Self { Nested::Set(value) }
}

/// Iterating a tree yields its flattened scalars, as [autoexpand] would
/// return them
impl<T: Leaf> IntoIterator for Nested<T> {
  type Item = T;
  type IntoIter = std::vec::IntoIter<T>;
  fn into_iter(self) -> Self::IntoIter { autoexpand(self).into_iter() }
}

/// Builds a [Nested] tree with bracket shapes that mirror collection
/// literals: `[..]` is a list, `(..)` a tuple, `{..}` a set and any
/// other expression a scalar.
///
/// ```
/// use craftr_utils::lists::{autoexpand, Nested};
/// use craftr_utils::nested;
///
/// let tree: Nested<String> = nested!(["spam", ("eggs", {"ham"})]);
/// let flat: Vec<String> = autoexpand(tree);
/// assert_eq!(flat, vec!["spam", "eggs", "ham"]);
/// ```
///
/// Invoke it with parentheses or square brackets; a braced invocation
/// would swallow the braces of a top-level set.
#[macro_export]
macro_rules! nested {
  ([$($item:tt),* $(,)?]) => {
    $crate::lists::Nested::List(vec![$($crate::nested!($item)),*])
  };
  (($($item:tt),* $(,)?)) => {
    $crate::lists::Nested::Tuple(vec![$($crate::nested!($item)),*])
  };
  ({$($item:expr),* $(,)?}) => {
    $crate::lists::Nested::set(
      [$($crate::lists::Nested::from($item)),*].into_iter().flatten()
    )
  };
  ($scalar:expr) => {
    $crate::lists::Nested::from($scalar)
  };
}

/// Flatten arbitrarily nested groups into the flat list of their
/// scalars, in encounter order. A bare scalar yields a one-element
/// list. Set members appear in their set's iteration order, which is
/// arbitrary.
#[must_use = "This is a pure function"]
pub fn autoexpand<T: Leaf>(value: impl Into<Nested<T>>) -> Vec<T> {
  let mut out = Vec::new();
  flatten_into(value.into(), &mut out);
  out
}

fn flatten_into<T: Leaf>(value: Nested<T>, out: &mut Vec<T>) {
  match value {
    Nested::Scalar(value) => out.push(value),
    Nested::List(items) | Nested::Tuple(items) =>
      items.into_iter().for_each(|i| flatten_into(i, out)),
    Nested::Set(items) => out.extend(items),
  }
}
