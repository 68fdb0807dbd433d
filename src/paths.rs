//! Path normalisation, list expansion, and token escaping.
//!
//! These are the pure helpers every section of a dependency manifest goes
//! through: paths are rendered in portable forward-slash form, list-valued
//! properties are split with CMake list semantics, and tokens are quoted so
//! the scanner reads back exactly what was written.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use itertools::Itertools;

/// Render `path` with forward slashes only.
///
/// Backslashes become `/`, runs of separators collapse (a leading `//`
/// network prefix is kept), and a trailing separator is dropped unless the
/// path is a root.
///
/// ```rust
/// use depinfo::paths::to_portable_path;
/// assert_eq!(to_portable_path("C:\\src\\\\lib\\"), "C:/src/lib");
/// assert_eq!(to_portable_path("//server/share/"), "//server/share");
/// assert_eq!(to_portable_path("/"), "/");
/// ```
#[must_use]
pub fn to_portable_path(path: impl AsRef<str>) -> String {
    let forward = path.as_ref().replace('\\', "/");
    let (prefix, rest) = forward
        .strip_prefix("//")
        .filter(|tail| !tail.starts_with('/'))
        .map_or(("", forward.as_str()), |tail| ("//", tail));
    let mut out = String::with_capacity(forward.len());
    out.push_str(prefix);
    let mut previous_slash = false;
    for ch in rest.chars() {
        if ch == '/' && previous_slash {
            continue;
        }
        previous_slash = ch == '/';
        out.push(ch);
    }
    let is_root = out == "/" || (out.len() == 3 && out.ends_with(":/"));
    if out.len() > 1 && out.ends_with('/') && !is_root && out != "//" {
        out.pop();
    }
    out
}

/// Express `path` relative to `base` in portable form.
///
/// Both paths must be absolute for a relative result; otherwise (or when the
/// paths share no root) `path` is returned unchanged apart from portable
/// normalisation. Identical paths yield `"."`.
///
/// ```rust
/// use camino::Utf8Path;
/// use depinfo::paths::relative_to;
/// let base = Utf8Path::new("/work/build");
/// assert_eq!(relative_to(base, Utf8Path::new("/work/build/sub/x")), "sub/x");
/// assert_eq!(relative_to(base, Utf8Path::new("/work/src/include")), "../src/include");
/// assert_eq!(relative_to(base, Utf8Path::new("rel/dir")), "rel/dir");
/// ```
#[must_use]
pub fn relative_to(base: &Utf8Path, path: &Utf8Path) -> String {
    if !base.is_absolute() || !path.is_absolute() {
        return to_portable_path(path);
    }
    let base_parts = normal_components(base);
    let path_parts = normal_components(path);
    if base_parts.first() != path_parts.first() {
        return to_portable_path(path);
    }
    let shared = base_parts
        .iter()
        .zip(&path_parts)
        .take_while(|(a, b)| a == b)
        .count();
    let ups = base_parts.len().saturating_sub(shared);
    let relative = std::iter::repeat_n("..", ups)
        .chain(path_parts.iter().skip(shared).map(String::as_str))
        .join("/");
    if relative.is_empty() {
        ".".to_owned()
    } else {
        relative
    }
}

/// Components of `path` with `.` removed and `..` folded; the first element
/// identifies the root (prefix and root directory) so unrelated drives never
/// share a prefix.
fn normal_components(path: &Utf8Path) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut root = String::new();
    for component in path.components() {
        match component {
            Utf8Component::Prefix(prefix) => root.push_str(prefix.as_str()),
            Utf8Component::RootDir => root.push('/'),
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                parts.pop();
            }
            Utf8Component::Normal(part) => parts.push(part.to_owned()),
        }
    }
    parts.insert(0, root);
    parts
}

/// Join a directory and a relative path, returning the portable form.
#[must_use]
pub fn portable_join(dir: &Utf8Path, rest: impl AsRef<Utf8Path>) -> String {
    let joined: Utf8PathBuf = dir.join(rest);
    to_portable_path(joined)
}

/// Split a list-valued property into its elements.
///
/// `;` separates elements and empty elements are dropped. A backslash before
/// `;` yields a literal semicolon, and semicolons nested inside square
/// brackets do not split.
///
/// ```rust
/// use depinfo::paths::expand_list;
/// assert_eq!(expand_list("A;;B=1"), ["A", "B=1"]);
/// assert_eq!(expand_list("X=a\\;b"), ["X=a;b"]);
/// assert_eq!(expand_list("L=[a;b];C"), ["L=[a;b]", "C"]);
/// ```
#[must_use]
pub fn expand_list(value: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut chars = value.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&';') => {
                current.push(';');
                chars.next();
            }
            '[' => {
                depth += 1;
                current.push(ch);
            }
            ']' if depth > 0 => {
                depth -= 1;
                current.push(ch);
            }
            ';' if depth == 0 => {
                if !current.is_empty() {
                    items.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        items.push(current);
    }
    items
}

/// Quote a token for the persisted script.
///
/// The token is wrapped in double quotes and `\`, `"`, and `$` are
/// backslash-escaped, so variable references are never expanded when the
/// scanner reads the file. [`unescape_persisted`] is the inverse.
///
/// ```rust
/// use depinfo::paths::escape_for_persistence;
/// assert_eq!(escape_for_persistence(r#"MSG="hi $USER""#), r#""MSG=\"hi \$USER\"""#);
/// ```
#[must_use]
pub fn escape_for_persistence(token: &str) -> String {
    let mut out = String::with_capacity(token.len() + 2);
    out.push('"');
    for ch in token.chars() {
        if matches!(ch, '\\' | '"' | '$') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Recover the original token from [`escape_for_persistence`] output.
///
/// Returns `None` when `quoted` is not a well-formed quoted token.
#[must_use]
pub fn unescape_persisted(quoted: &str) -> Option<String> {
    let inner = quoted.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => out.push(chars.next()?),
            '"' => return None,
            _ => out.push(ch),
        }
    }
    Some(out)
}
