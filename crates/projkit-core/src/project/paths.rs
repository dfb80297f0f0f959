//! Lexical path handling for item includes
//!
//! Includes are written with `\` separators regardless of host platform and
//! may carry a drive prefix (`C:`), so they are handled as text rather than
//! through [`std::path::Path`]. Nothing here touches the filesystem.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Separator written into rewritten includes
pub const INCLUDE_SEPARATOR: char = '\\';

/// A path split into its root and normalized segments
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexicalPath {
    /// Drive prefix such as `C:`, if any
    drive: Option<String>,
    /// Starts at a root (`\`, `/` or a drive root)
    rooted: bool,
    segments: Vec<String>,
}

impl LexicalPath {
    fn parse(text: &str) -> Self {
        let (drive, rest) = split_drive(text);
        let rooted = rest.starts_with(['\\', '/']);
        let mut path = Self {
            drive,
            rooted,
            segments: Vec::new(),
        };
        path.push(rest);
        path
    }

    fn is_absolute(&self) -> bool {
        self.rooted
    }

    /// Append relative text, resolving `.` and `..` as it goes
    fn push(&mut self, relative: &str) {
        for segment in relative.split(['\\', '/']) {
            match segment {
                "" | "." => {}
                ".." => {
                    let can_pop = self.segments.last().is_some_and(|last| last != "..");
                    if can_pop {
                        self.segments.pop();
                    } else if !self.rooted {
                        self.segments.push("..".to_string());
                    }
                }
                other => self.segments.push(other.to_string()),
            }
        }
    }

    fn same_root(&self, other: &Self) -> bool {
        self.rooted == other.rooted
            && match (&self.drive, &other.drive) {
                (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
                (None, None) => true,
                _ => false,
            }
    }

    fn segment_eq(&self, a: &str, b: &str) -> bool {
        // Drive-letter paths come from case-insensitive filesystems
        if self.drive.is_some() {
            a.eq_ignore_ascii_case(b)
        } else {
            a == b
        }
    }

    fn render(&self) -> String {
        let mut out = String::new();
        if let Some(drive) = &self.drive {
            out.push_str(drive);
        }
        if self.rooted {
            out.push(INCLUDE_SEPARATOR);
        }
        out.push_str(&self.segments.join(&INCLUDE_SEPARATOR.to_string()));
        out
    }
}

fn split_drive(text: &str) -> (Option<String>, &str) {
    let bytes = text.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        (Some(text[..2].to_string()), &text[2..])
    } else {
        (None, text)
    }
}

/// Resolve `include` against `base_dir`, producing a normalized absolute
/// (or base-relative, if the base itself is relative) path
pub fn resolve_include(base_dir: &str, include: &str) -> String {
    resolve(base_dir, include).render()
}

fn resolve(base_dir: &str, include: &str) -> LexicalPath {
    let target = LexicalPath::parse(include);
    if target.is_absolute() {
        return target;
    }
    let mut base = LexicalPath::parse(base_dir);
    if target.drive.is_some() && !base.same_root(&target) {
        // `C:foo` against another drive; keep as written
        return target;
    }
    base.push(include.get(target.drive.as_ref().map_or(0, |d| d.len())..).unwrap_or(include));
    base
}

/// Express `target` relative to `base_dir`
///
/// Returns `None` when the two do not share a root (different drives, or
/// one rooted and one not); there is no relative form in that case.
fn relative_to(target: &LexicalPath, base_dir: &LexicalPath) -> Option<String> {
    if !target.same_root(base_dir) {
        return None;
    }
    let common = target
        .segments
        .iter()
        .zip(&base_dir.segments)
        .take_while(|(a, b)| base_dir.segment_eq(a, b))
        .count();

    let mut parts: Vec<&str> = Vec::new();
    parts.extend(std::iter::repeat("..").take(base_dir.segments.len() - common));
    parts.extend(target.segments[common..].iter().map(String::as_str));
    Some(parts.join(&INCLUDE_SEPARATOR.to_string()))
}

/// Rewrite an include written relative to `from_dir` so it points at the
/// same file when written relative to `to_dir`
///
/// ```
/// use projkit_core::project::rebase_include;
///
/// let rebased = rebase_include(r"..\Shared\Foo.cs", r"C:\Proj\A\", r"C:\Proj\B\");
/// assert_eq!(rebased, r"..\Shared\Foo.cs");
///
/// let rebased = rebase_include(r"Foo.cs", r"C:\Proj\A", r"C:\Proj\B");
/// assert_eq!(rebased, r"..\A\Foo.cs");
/// ```
pub fn rebase_include(include: &str, from_dir: &str, to_dir: &str) -> String {
    let absolute = resolve(from_dir, include);
    let target_dir = LexicalPath::parse(to_dir);
    relative_to(&absolute, &target_dir).unwrap_or_else(|| absolute.render())
}

/// Last segment of an include, e.g. `Foo.cs` for `..\Shared\Foo.cs`
pub fn include_file_name(include: &str) -> Option<&str> {
    include
        .rsplit(['\\', '/'])
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
}

/// Directory of a project file, as text for include resolution
pub fn project_directory(project_path: &Path) -> String {
    project_path
        .parent()
        .map(|dir| dir.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Absolute, lexically cleaned form of a project path, used as registry key
///
/// Does not touch the filesystem, so paths of files that do not exist yet
/// normalize too. Symlinks are not resolved.
pub fn normalize_project_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rebase_sibling_directory() {
        // C:\Proj\A\..\Shared\Foo.cs is C:\Proj\Shared\Foo.cs
        let rebased = rebase_include(r"..\Shared\Foo.cs", r"C:\Proj\A\", r"C:\Proj\B\");
        assert_eq!(rebased, r"..\Shared\Foo.cs");
        assert_eq!(resolve_include(r"C:\Proj\B\", &rebased), r"C:\Proj\Shared\Foo.cs");
        assert_eq!(
            resolve_include(r"C:\Proj\A\", r"..\Shared\Foo.cs"),
            resolve_include(r"C:\Proj\B\", &rebased)
        );
    }

    #[test]
    fn test_rebase_into_deeper_directory() {
        let rebased = rebase_include(r"Code\Foo.cs", r"C:\Proj\A", r"C:\Proj\A\Nested\Deeper");
        assert_eq!(rebased, r"..\..\Code\Foo.cs");
        assert_eq!(
            resolve_include(r"C:\Proj\A\Nested\Deeper", &rebased),
            r"C:\Proj\A\Code\Foo.cs"
        );
    }

    #[test]
    fn test_rebase_unix_paths() {
        let rebased = rebase_include("../Shared/Foo.cs", "/work/A", "/work/other/B");
        assert_eq!(rebased, r"..\..\Shared\Foo.cs");
        assert_eq!(resolve_include("/work/other/B", &rebased), r"\work\Shared\Foo.cs");
    }

    #[test]
    fn test_drive_letters_compare_case_insensitively() {
        let rebased = rebase_include(r"Foo.cs", r"c:\proj\a", r"C:\Proj\B");
        assert_eq!(rebased, r"..\a\Foo.cs");
    }

    #[test]
    fn test_different_drive_keeps_absolute() {
        let rebased = rebase_include(r"..\Shared\Foo.cs", r"C:\Proj\A", r"D:\Elsewhere");
        assert_eq!(rebased, r"C:\Proj\Shared\Foo.cs");
    }

    #[test]
    fn test_absolute_include_becomes_relative_on_same_root() {
        let rebased = rebase_include(r"C:\Shared\Foo.cs", r"C:\Proj\A", r"C:\Proj\B");
        assert_eq!(rebased, r"..\..\Shared\Foo.cs");
    }

    #[test]
    fn test_parent_above_root_is_clamped() {
        assert_eq!(resolve_include(r"C:\", r"..\..\Foo.cs"), r"C:\Foo.cs");
        assert_eq!(resolve_include(r"rel", r"..\..\Foo.cs"), r"..\Foo.cs");
    }

    #[test]
    fn test_include_file_name() {
        assert_eq!(include_file_name(r"..\Shared\Foo.cs"), Some("Foo.cs"));
        assert_eq!(include_file_name("Foo.cs"), Some("Foo.cs"));
        assert_eq!(include_file_name("dir/Bar.cs"), Some("Bar.cs"));
        assert_eq!(include_file_name(r"dir\"), None);
    }

    #[test]
    fn test_normalize_project_path() {
        let normalized = normalize_project_path(Path::new("/work/./A/../B/B.proj")).unwrap();
        assert_eq!(normalized, PathBuf::from("/work/B/B.proj"));
        assert!(normalize_project_path(Path::new("relative.proj"))
            .unwrap()
            .is_absolute());
    }
}
