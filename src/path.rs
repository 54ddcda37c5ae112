//! Path-string helpers for build scripts.
//!
//! Everything here is a pure string transformation; nothing touches the
//! filesystem. The rules that decide what counts as a separator or an
//! absolute path live in a [PathStyle] passed to every operation, so a
//! build script behaves identically on every host. The convention is
//! always an explicit parameter, never process-global state.

use std::iter;

use itertools::Itertools;

use crate::error::{UtilError, UtilResult};

/// A platform's path conventions. Only the separator and anchor rules
/// are required; every derived operation is a provided method defined in
/// terms of them, so an implementor is just a description of how paths
/// are written.
pub trait PathStyle {
  /// The canonical separator emitted between joined segments
  fn sep(&self) -> char;
  /// Whether a character separates segments on input
  fn is_sep(&self, c: char) -> bool;
  /// The leading root of a path: the part before the first segment, such
  /// as `/` or `C:\`. Empty for relative paths.
  fn anchor<'a>(&self, path: &'a str) -> &'a str;

  /// Whether a path is anchored to a root rather than relative
  fn is_absolute(&self, path: &str) -> bool { !self.anchor(path).is_empty() }

  /// Split a path into a directory part and a final segment. The final
  /// segment never contains a separator; the directory part keeps a lone
  /// root but otherwise has its trailing separators stripped.
  fn split<'a>(&self, path: &'a str) -> (&'a str, &'a str) {
    let cut = (path.char_indices().rfind(|(_, c)| self.is_sep(*c)))
      .map_or(0, |(i, c)| i + c.len_utf8());
    let (head, tail) = path.split_at(cut);
    let trimmed = head.trim_end_matches(|c: char| self.is_sep(c));
    if trimmed.is_empty() { (head, tail) } else { (trimmed, tail) }
  }

  /// The directory part of [PathStyle::split]
  fn dirname<'a>(&self, path: &'a str) -> &'a str { self.split(path).0 }

  /// The final segment of [PathStyle::split]
  fn basename<'a>(&self, path: &'a str) -> &'a str { self.split(path).1 }

  /// Concatenate two paths with exactly one separator between them. An
  /// absolute `tail` replaces `head` outright and an empty `head`
  /// contributes nothing, matching the usual rules for joining a
  /// user-supplied path onto a base.
  fn join(&self, head: &str, tail: &str) -> String {
    if head.is_empty() || self.is_absolute(tail) {
      return tail.to_string();
    }
    let mut out = String::with_capacity(head.len() + tail.len() + 1);
    out.push_str(head);
    if !head.ends_with(|c: char| self.is_sep(c)) {
      out.push(self.sep());
    }
    out.push_str(tail);
    out
  }

  /// Split the extension off the final segment; the extension includes
  /// its dot. A dot that only has further dots before it in the segment
  /// starts no extension, so dotfiles like `.bashrc` are whole names.
  fn split_ext<'a>(&self, path: &'a str) -> (&'a str, &'a str) {
    let base_at = path.len() - self.split(path).1.len();
    let base = &path[base_at..];
    match base.rfind('.') {
      Some(i) if base[..i].chars().any(|c| c != '.') => path.split_at(base_at + i),
      _ => (path, ""),
    }
  }

  /// Non-empty path components after the anchor
  fn segments<'a>(&self, path: &'a str) -> Vec<&'a str> {
    path[self.anchor(path).len()..]
      .split(|c: char| self.is_sep(c))
      .filter(|s| !s.is_empty())
      .collect()
  }

  /// Lexically normalize a path: collapse repeated separators, drop `.`
  /// segments and resolve `..` against real segments. A `..` at an
  /// absolute root disappears; in a relative path with nothing left to
  /// pop it is preserved. The empty path normalizes to `.`.
  fn normalize(&self, path: &str) -> String {
    let anchor = canon_anchor(self, path);
    let mut parts: Vec<&str> = Vec::new();
    for part in path[self.anchor(path).len()..].split(|c: char| self.is_sep(c)) {
      match part {
        "" | "." => (),
        ".." =>
          if anchor.is_empty() && parts.last().map_or(true, |l| *l == "..") {
            parts.push("..");
          } else {
            parts.pop();
          },
        seg => parts.push(seg),
      }
    }
    let body = parts.join(&self.sep().to_string());
    match (anchor.is_empty(), body.is_empty()) {
      (true, true) => ".".to_string(),
      (true, false) => body,
      (false, true) => anchor,
      (false, false) => format!("{anchor}{body}"),
    }
  }

  /// The lexical relative path that leads from `start` to `path`, `.`
  /// when they are equal. Both arguments are normalized first. The two
  /// should share an anchor; when they do not, no relative walk exists
  /// and the normalized `path` is returned unchanged so that the
  /// function stays total.
  fn relpath(&self, path: &str, start: &str) -> String {
    let p = self.normalize(path);
    let s = self.normalize(start);
    if canon_anchor(self, &p) != canon_anchor(self, &s) {
      return p;
    }
    let psegs = clean_segments(self, &p);
    let ssegs = clean_segments(self, &s);
    let shared = psegs.iter().zip(&ssegs).take_while(|(a, b)| a == b).count();
    let hops = iter::repeat("..").take(ssegs.len() - shared);
    let rel = hops.chain(psegs[shared..].iter().copied()).join(&self.sep().to_string());
    if rel.is_empty() { ".".to_string() } else { rel }
  }
}

/// The anchor of a path with every separator replaced by the canonical
/// one, so anchors written with either separator compare equal
fn canon_anchor<S: PathStyle + ?Sized>(style: &S, path: &str) -> String {
  (style.anchor(path).chars())
    .map(|c| if style.is_sep(c) { style.sep() } else { c })
    .collect()
}

fn clean_segments<'a, S: PathStyle + ?Sized>(style: &S, path: &'a str) -> Vec<&'a str> {
  style.segments(path).into_iter().filter(|c| *c != ".").collect()
}

/// Forward-slash conventions, identical on every host. This is the
/// style build scripts are written in and the one the test suite pins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Posix;
impl PathStyle for Posix {
  fn sep(&self) -> char { '/' }
  fn is_sep(&self, c: char) -> bool { c == '/' }
  fn anchor<'a>(&self, path: &'a str) -> &'a str {
    if path.starts_with('/') { &path[..1] } else { "" }
  }
}

/// Backslash conventions. Either separator is accepted on input and `\`
/// is emitted; a path is absolute when it starts with a separator or a
/// drive prefix such as `C:\`. Drive-relative paths like `C:foo` are
/// treated as relative, a lexical simplification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Windows;
impl PathStyle for Windows {
  fn sep(&self) -> char { '\\' }
  fn is_sep(&self, c: char) -> bool { c == '/' || c == '\\' }
  fn anchor<'a>(&self, path: &'a str) -> &'a str {
    let b = path.as_bytes();
    if b.first().map_or(false, |c| self.is_sep(*c as char)) {
      return &path[..1];
    }
    if b.len() >= 3 && b[0].is_ascii_alphabetic() && b[1] == b':' && self.is_sep(b[2] as char) {
      return &path[..3];
    }
    ""
  }
}

/// The conventions of the machine running the build
#[cfg(windows)]
pub type Native = Windows;
/// The conventions of the machine running the build
#[cfg(not(windows))]
pub type Native = Posix;

/// Error produced when [commonpath] receives paths with conflicting
/// anchors, such as a mix of absolute and relative paths, across which
/// no common path is defined. Carries the expected anchor and the
/// offending path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorMismatch(pub String, pub String);
impl UtilError for AnchorMismatch {
  const DESCRIPTION: &'static str = "differently anchored paths have no common path";
  fn message(&self) -> String {
    format!("{}: {:?} among paths anchored at {:?}", Self::DESCRIPTION, self.1, self.0)
  }
}

/// Error produced when [commonpath] is called with no paths at all; the
/// common path of an empty set is undefined
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct NoPaths;
impl UtilError for NoPaths {
  const DESCRIPTION: &'static str = "cannot take the common path of no paths";
}

/// One path or a sequence of paths. Operations that accept this apply
/// to a single path directly and element-wise over a sequence, returning
/// the matching shape: a string in, a string out; a sequence in, a
/// sequence of the same length out.
pub trait PathArg {
  /// The shape of the transformed value
  type Out;
  /// Apply a string transformation to every path in the argument
  fn map_paths(self, f: impl FnMut(&str) -> String) -> Self::Out;
}
impl<'a> PathArg for &'a str {
  type Out = String;
  fn map_paths(self, mut f: impl FnMut(&str) -> String) -> String { f(self) }
}
impl<'a> PathArg for &'a String {
  type Out = String;
  fn map_paths(self, mut f: impl FnMut(&str) -> String) -> String { f(self) }
}
impl PathArg for String {
  type Out = String;
  fn map_paths(self, mut f: impl FnMut(&str) -> String) -> String { f(&self) }
}
impl<'a, S: AsRef<str>> PathArg for &'a [S] {
  type Out = Vec<String>;
  fn map_paths(self, mut f: impl FnMut(&str) -> String) -> Vec<String> {
    self.iter().map(|p| f(p.as_ref())).collect()
  }
}
impl<'a, S: AsRef<str>, const N: usize> PathArg for &'a [S; N] {
  type Out = Vec<String>;
  fn map_paths(self, f: impl FnMut(&str) -> String) -> Vec<String> {
    self.as_slice().map_paths(f)
  }
}
impl<S: AsRef<str>, const N: usize> PathArg for [S; N] {
  type Out = Vec<String>;
  fn map_paths(self, f: impl FnMut(&str) -> String) -> Vec<String> {
    self.as_slice().map_paths(f)
  }
}
impl<S: AsRef<str>> PathArg for Vec<S> {
  type Out = Vec<String>;
  fn map_paths(self, f: impl FnMut(&str) -> String) -> Vec<String> {
    self.as_slice().map_paths(f)
  }
}
impl<'a, S: AsRef<str>> PathArg for &'a Vec<S> {
  type Out = Vec<String>;
  fn map_paths(self, f: impl FnMut(&str) -> String) -> Vec<String> {
    self.as_slice().map_paths(f)
  }
}

/// Insert `prefix` directly before the final segment of each path,
/// leaving every directory segment untouched.
#[must_use = "This is a pure function"]
pub fn addprefix<P: PathArg>(style: &impl PathStyle, paths: P, prefix: &str) -> P::Out {
  paths.map_paths(|p| {
    let (head, tail) = style.split(p);
    style.join(head, &format!("{prefix}{tail}"))
  })
}

/// Append `suffix` to each path. With `replace` the current extension of
/// the final segment is stripped first, so passing `None` or an empty
/// suffix plainly removes the extension; without `replace` the suffix
/// lands verbatim after the full existing name.
#[must_use = "This is a pure function"]
pub fn addsuffix<P: PathArg>(
  style: &impl PathStyle,
  paths: P,
  suffix: Option<&str>,
  replace: bool,
) -> P::Out {
  paths.map_paths(|p| {
    let stem = if replace { style.split_ext(p).0 } else { p };
    match suffix {
      Some(s) => format!("{stem}{s}"),
      None => stem.to_string(),
    }
  })
}

/// The deepest directory every path shares, by whole segments; a
/// segment is never split. Relative paths with nothing in common yield
/// the empty string, absolute ones their root. All paths must agree on
/// their anchor: a mix of absolute and relative paths has no common
/// path and is an error, as is an empty input.
pub fn commonpath<S: AsRef<str>>(style: &impl PathStyle, paths: &[S]) -> UtilResult<String> {
  let first = paths.first().ok_or_else(|| NoPaths.pack())?.as_ref();
  let anchor = canon_anchor(style, first);
  let mut common = clean_segments(style, first);
  for p in &paths[1..] {
    let p = p.as_ref();
    if canon_anchor(style, p) != anchor {
      return Err(AnchorMismatch(anchor, p.to_string()).pack());
    }
    let segs = clean_segments(style, p);
    let shared = common.iter().zip(&segs).take_while(|(a, b)| a == b).count();
    common.truncate(shared);
  }
  let body = common.join(&style.sep().to_string());
  Ok(format!("{anchor}{body}"))
}

/// Rewrite each path relative to `base` to sit under `new_base` instead,
/// preserving the remainder below `base` exactly. Defined as joining
/// `new_base` with the relative walk from `base`, then normalizing; a
/// path outside `base` therefore comes out unchanged apart from
/// normalization.
#[must_use = "This is a pure function"]
pub fn rebase<P: PathArg>(
  style: &impl PathStyle,
  paths: P,
  base: &str,
  new_base: &str,
) -> P::Out {
  paths.map_paths(|p| style.normalize(&style.join(new_base, &style.relpath(p, base))))
}

#[cfg(test)]
mod test {
  use super::*;
  use crate::error::DynUtilError;

  #[test]
  fn addprefix_single() {
    assert_eq!(addprefix(&Posix, "foo/bar/baz", "spam-"), "foo/bar/spam-baz");
  }

  #[test]
  fn addprefix_many() {
    assert_eq!(
      addprefix(&Posix, &["foo/bar/baz", "foo/bar/ham/cheeck", "/gogodo"], "egg_"),
      vec!["foo/bar/egg_baz", "foo/bar/ham/egg_cheeck", "/egg_gogodo"]
    );
  }

  #[test]
  fn addprefix_touches_only_the_final_segment() {
    let once = addprefix(&Posix, "a/b/c", "x-");
    let twice = addprefix(&Posix, &once, "y-");
    assert_eq!(twice, "a/b/y-x-c");
    assert_eq!(Posix.segments(&twice).len(), 3, "segment count is preserved");
  }

  #[test]
  fn addsuffix_replacing() {
    assert_eq!(addsuffix(&Posix, "foo/bar/baz", Some(".eggs"), true), "foo/bar/baz.eggs");
    assert_eq!(addsuffix(&Posix, "foo/bar/baz.spam", Some(".eggs"), true), "foo/bar/baz.eggs");
    assert_eq!(addsuffix(&Posix, "foo/bar/baz.spam", None, true), "foo/bar/baz");
    assert_eq!(addsuffix(&Posix, "foo/bar/baz.spam", Some(""), true), "foo/bar/baz");
    assert_eq!(
      addsuffix(
        &Posix,
        &["foo/bar/baz", "foo/bar/baz.spam", "foo/bar/baz.baz"],
        Some(".eggs"),
        true
      ),
      vec!["foo/bar/baz.eggs", "foo/bar/baz.eggs", "foo/bar/baz.eggs"]
    );
  }

  #[test]
  fn addsuffix_appending() {
    assert_eq!(addsuffix(&Posix, "foo/bar/baz.spam", Some("eggs"), false), "foo/bar/baz.spameggs");
    assert_eq!(
      addsuffix(&Posix, "foo/bar/baz.spam", Some(".eggs"), false),
      "foo/bar/baz.spam.eggs"
    );
    assert_eq!(
      addsuffix(
        &Posix,
        &["foo/bar/baz", "foo/bar/baz.spam", "foo/bar/baz.baz"],
        Some("eggs"),
        false
      ),
      vec!["foo/bar/bazeggs", "foo/bar/baz.spameggs", "foo/bar/baz.bazeggs"]
    );
  }

  #[test]
  fn addsuffix_preserves_sequence_length() {
    let out = addsuffix(&Posix, &["a.c", "b/c.h", "d"], Some(".o"), true);
    assert_eq!(out.len(), 3);
  }

  #[test]
  fn dotfiles_have_no_extension() {
    assert_eq!(Posix.split_ext("home/.bashrc"), ("home/.bashrc", ""));
    assert_eq!(addsuffix(&Posix, "home/.bashrc", None, true), "home/.bashrc");
    assert_eq!(Posix.split_ext("a/..b.c"), ("a/..b", ".c"));
  }

  #[test]
  fn commonpath_absolute() {
    assert_eq!(commonpath(&Posix, &["/foo/bar", "/foo/bar/baz"]).unwrap(), "/foo/bar");
  }

  #[test]
  fn commonpath_relative() {
    assert_eq!(commonpath(&Posix, &["foo/bar", "foo/bar/baz"]).unwrap(), "foo/bar");
  }

  #[test]
  fn commonpath_rejects_mixed_anchors() {
    let err = commonpath(&Posix, &["/foo/bar", "foo/bar/baz"]).expect_err("anchors differ");
    assert!(err.as_any_ref().downcast_ref::<AnchorMismatch>().is_some());
  }

  #[test]
  fn commonpath_never_splits_a_segment() {
    assert_eq!(commonpath(&Posix, &["/foo/bar", "/foo/baz"]).unwrap(), "/foo");
    assert_eq!(commonpath(&Posix, &["/foobar", "/foobaz"]).unwrap(), "/");
    assert_eq!(commonpath(&Posix, &["foo", "bar"]).unwrap(), "");
  }

  #[test]
  fn commonpath_ignores_repeated_separators() {
    assert_eq!(commonpath(&Posix, &["foo//bar", "foo/bar/baz"]).unwrap(), "foo/bar");
  }

  #[test]
  fn commonpath_of_one_and_of_none() {
    assert_eq!(commonpath(&Posix, &["/a/b"]).unwrap(), "/a/b");
    let none: [&str; 0] = [];
    let err = commonpath(&Posix, &none).expect_err("empty input");
    assert!(err.as_any_ref().downcast_ref::<NoPaths>().is_some());
  }

  #[test]
  fn rebase_moves_whole_trees() {
    let files = ["foo/bar/main.c", "foo/bar/spam.c", "foo/bar/utils/eggs.c"];
    assert_eq!(
      rebase(&Posix, &files, "foo/bar", "eggs/ham"),
      vec!["eggs/ham/main.c", "eggs/ham/spam.c", "eggs/ham/utils/eggs.c"]
    );
  }

  #[test]
  fn rebase_leaves_outsiders_alone() {
    assert_eq!(rebase(&Posix, "lib/x.c", "foo/bar", "eggs/ham"), "lib/x.c");
    assert_eq!(rebase(&Posix, "/abs/x.c", "foo/bar", "eggs/ham"), "/abs/x.c");
  }

  #[test]
  fn split_keeps_a_lone_root() {
    assert_eq!(Posix.split("/gogodo"), ("/", "gogodo"));
    assert_eq!(Posix.split("foo/bar/baz"), ("foo/bar", "baz"));
    assert_eq!(Posix.split("baz"), ("", "baz"));
    assert_eq!(Posix.split("foo/bar/"), ("foo/bar", ""));
  }

  // U+2215 division slash, three bytes long
  struct Division;
  impl PathStyle for Division {
    fn sep(&self) -> char { '∕' }
    fn is_sep(&self, c: char) -> bool { c == '∕' }
    fn anchor<'a>(&self, path: &'a str) -> &'a str {
      if path.starts_with('∕') { &path[..'∕'.len_utf8()] } else { "" }
    }
  }

  #[test]
  fn multibyte_separators_split_on_char_boundaries() {
    assert_eq!(Division.split("a∕b"), ("a", "b"));
    assert_eq!(Division.split("∕gogodo"), ("∕", "gogodo"));
    assert_eq!(Division.join("a", "b"), "a∕b");
    assert_eq!(Division.normalize("a∕∕b∕."), "a∕b");
  }

  #[test]
  fn join_rules() {
    assert_eq!(Posix.join("foo/bar", "baz"), "foo/bar/baz");
    assert_eq!(Posix.join("", "baz"), "baz");
    assert_eq!(Posix.join("foo/", "baz"), "foo/baz");
    assert_eq!(Posix.join("foo", "/abs"), "/abs", "an absolute tail wins");
  }

  #[test]
  fn normalize_rules() {
    assert_eq!(Posix.normalize(""), ".");
    assert_eq!(Posix.normalize("a//b/./c"), "a/b/c");
    assert_eq!(Posix.normalize("a/b/../c"), "a/c");
    assert_eq!(Posix.normalize("../a"), "../a");
    assert_eq!(Posix.normalize("a/../../b"), "../b");
    assert_eq!(Posix.normalize("/../a"), "/a");
    assert_eq!(Posix.normalize("/a/b/.."), "/a");
  }

  #[test]
  fn relpath_rules() {
    assert_eq!(Posix.relpath("foo/bar/main.c", "foo/bar"), "main.c");
    assert_eq!(Posix.relpath("/foo/bar", "/foo/spam"), "../bar");
    assert_eq!(Posix.relpath("/foo", "/foo"), ".");
    assert_eq!(Posix.relpath("/", "/a"), "..");
    assert_eq!(Posix.relpath("/abs", "rel"), "/abs", "mixed anchors fall back to the path");
  }

  #[test]
  fn windows_accepts_both_separators() {
    assert_eq!(Windows.split("a\\b/c"), ("a\\b", "c"));
    assert_eq!(Windows.join("a", "b"), "a\\b");
    assert_eq!(Windows.normalize("C:/x/./y"), "C:\\x\\y");
    assert!(Windows.is_absolute("C:\\x"));
    assert!(Windows.is_absolute("\\x"));
    assert!(!Windows.is_absolute("x\\y"));
    assert!(!Windows.is_absolute("C:x"));
  }

  #[test]
  fn windows_commonpath_checks_drives() {
    assert_eq!(commonpath(&Windows, &["C:\\a\\b", "C:/a/c"]).unwrap(), "C:\\a");
    let err = commonpath(&Windows, &["C:\\a", "D:\\a"]).expect_err("drives differ");
    assert!(err.as_any_ref().downcast_ref::<AnchorMismatch>().is_some());
  }

  #[test]
  fn path_arg_shapes() {
    let owned: Vec<String> = vec!["a/b".to_string()];
    assert_eq!(addprefix(&Posix, &owned, "x-"), vec!["a/x-b"]);
    assert_eq!(addprefix(&Posix, owned, "x-"), vec!["a/x-b"]);
    assert_eq!(addprefix(&Posix, "a/b".to_string(), "x-"), "a/x-b");
  }
}
