//! Splitting repository-relative paths into the segment lists that rule
//! lookup and pattern matching operate on.

use std::fmt;

/// Marker used as the first segment of every [`PathComponents`].
pub const ROOT: &str = "/";

const SEPARATOR: char = '/';

/// A repository-relative path as `["/", dir, ..., file]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathComponents {
    segments: Vec<String>,
}

impl PathComponents {
    /// Split a `/`-separated path relative to the repository root.
    ///
    /// Leading and trailing separators are trimmed, nothing else is
    /// normalized. An empty path yields just the root marker.
    pub fn split(path: &str) -> Self {
        let mut segments = vec![ROOT.to_string()];
        let trimmed = path.trim_matches(SEPARATOR);
        if !trimmed.is_empty() {
            segments.extend(trimmed.split(SEPARATOR).map(str::to_string));
        }
        Self { segments }
    }

    /// Build from already separated segments (root marker excluded).
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut all = vec![ROOT.to_string()];
        all.extend(segments.into_iter().map(Into::into));
        Self { segments: all }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.segments
    }

    /// Proper prefixes from the root down to the file's own directory.
    ///
    /// Each prefix names a directory that may carry a rule file.
    pub fn ancestors(&self) -> impl Iterator<Item = &[String]> {
        (1..self.segments.len()).map(move |len| &self.segments[..len])
    }

    /// The segments below the root joined with `/`.
    pub fn relative(&self) -> String {
        self.segments[1..].join("/")
    }
}

impl fmt::Display for PathComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.relative())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_nested_path() {
        let path = PathComponents::split("secrets/prod/db.env");
        assert_eq!(path.as_slice(), ["/", "secrets", "prod", "db.env"]);
        assert_eq!(path.relative(), "secrets/prod/db.env");
    }

    #[test]
    fn split_trims_outer_separators() {
        let path = PathComponents::split("/a/b.txt/");
        assert_eq!(path.as_slice(), ["/", "a", "b.txt"]);
    }

    #[test]
    fn empty_path_is_root_only() {
        let path = PathComponents::split("");
        assert_eq!(path.as_slice(), [ROOT]);
        assert_eq!(path.ancestors().count(), 0);
    }

    #[test]
    fn ancestors_exclude_file_name() {
        let path = PathComponents::split("a/b/c.txt");
        let ancestors: Vec<_> = path.ancestors().collect();
        assert_eq!(ancestors.len(), 3);
        assert_eq!(ancestors[0], ["/"]);
        assert_eq!(ancestors[1], ["/", "a"]);
        assert_eq!(ancestors[2], ["/", "a", "b"]);
    }

    #[test]
    fn from_segments_matches_split() {
        assert_eq!(
            PathComponents::from_segments(["docs", "notes.md"]),
            PathComponents::split("docs/notes.md")
        );
    }
}
