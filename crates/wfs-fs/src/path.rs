//! Repository-relative path handling

/// A normalized, repository-relative path.
///
/// Always rooted (`/`-prefixed), `/`-separated, free of `.`, `..` and
/// empty segments, and without a trailing slash. The root is `/`.
/// Backslashes are accepted on input and converted to forward slashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogicalPath {
    inner: String,
}

impl LogicalPath {
    /// Normalize any path-like string.
    ///
    /// `..` never climbs above the root.
    pub fn new(path: impl AsRef<str>) -> Self {
        let normalized = path.as_ref().replace('\\', "/");
        let mut segments: Vec<&str> = Vec::new();
        for segment in normalized.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s => segments.push(s),
            }
        }
        Self {
            inner: format!("/{}", segments.join("/")),
        }
    }

    /// The root path `/`.
    pub fn root() -> Self {
        Self {
            inner: "/".to_string(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn is_root(&self) -> bool {
        self.inner == "/"
    }

    /// Join this path with a relative segment.
    pub fn join(&self, segment: &str) -> Self {
        Self::new(format!("{}/{}", self.inner, segment))
    }

    /// Get the parent directory. The root has none.
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.inner.rfind('/') {
            Some(0) => Some(Self::root()),
            Some(idx) => Some(Self {
                inner: self.inner[..idx].to_string(),
            }),
            None => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.inner.rsplit('/').next()
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 { None } else { Some(&name[idx + 1..]) }
        })
    }

    /// This path followed by every ancestor up to, but excluding, the root.
    ///
    /// `/a/b/c` yields `/a/b/c`, `/a/b`, `/a`.
    pub fn ancestors(&self) -> impl Iterator<Item = LogicalPath> {
        std::iter::successors(Some(self.clone()), LogicalPath::parent)
            .take_while(|p| !p.is_root())
    }
}

impl Default for LogicalPath {
    fn default() -> Self {
        Self::root()
    }
}

impl AsRef<str> for LogicalPath {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl std::fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for LogicalPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for LogicalPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&String> for LogicalPath {
    fn from(s: &String) -> Self {
        Self::new(s)
    }
}

impl From<&LogicalPath> for LogicalPath {
    fn from(p: &LogicalPath) -> Self {
        p.clone()
    }
}

/// Build the full storage path of `path` inside `repository`.
///
/// Computed at every call site; full paths are never handed back to callers.
pub fn join_paths(repository: &LogicalPath, path: &LogicalPath) -> String {
    match (repository.is_root(), path.is_root()) {
        (true, _) => path.inner.clone(),
        (false, true) => repository.inner.clone(),
        (false, false) => format!("{}{}", repository.inner, path.inner),
    }
}

/// Recover the repository-relative path from a full storage path.
///
/// Returns `None` when `full_path` lies outside `repository`.
pub fn strip_repository(repository: &LogicalPath, full_path: &str) -> Option<LogicalPath> {
    if repository.is_root() {
        return Some(LogicalPath::new(full_path));
    }
    let rest = full_path.strip_prefix(repository.as_str())?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(LogicalPath::new(rest))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "/")]
    #[case("/", "/")]
    #[case("a/b", "/a/b")]
    #[case("/a//b/", "/a/b")]
    #[case("\\a\\b.txt", "/a/b.txt")]
    #[case("/a/./b/../c", "/a/c")]
    #[case("/../../x", "/x")]
    fn normalizes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(LogicalPath::new(input).as_str(), expected);
    }

    #[test]
    fn parent_and_file_name() {
        let path = LogicalPath::new("/a/b.txt");
        assert_eq!(path.parent(), Some(LogicalPath::new("/a")));
        assert_eq!(path.file_name(), Some("b.txt"));
        assert_eq!(path.extension(), Some("txt"));
        assert_eq!(LogicalPath::new("/a").parent(), Some(LogicalPath::root()));
        assert_eq!(LogicalPath::root().parent(), None);
        assert_eq!(LogicalPath::root().file_name(), None);
        assert_eq!(LogicalPath::new("/.hidden").extension(), None);
    }

    #[test]
    fn ancestors_exclude_root() {
        let chain: Vec<String> = LogicalPath::new("/a/b/c")
            .ancestors()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(chain, vec!["/a/b/c", "/a/b", "/a"]);
        assert_eq!(LogicalPath::root().ancestors().count(), 0);
    }

    #[test]
    fn join_paths_concatenates() {
        let repo = LogicalPath::new("/sandbox");
        assert_eq!(join_paths(&repo, &LogicalPath::new("/a/b.txt")), "/sandbox/a/b.txt");
        assert_eq!(join_paths(&repo, &LogicalPath::root()), "/sandbox");
        assert_eq!(join_paths(&LogicalPath::root(), &LogicalPath::new("/a")), "/a");
    }

    #[test]
    fn strip_repository_inverts_join() {
        let repo = LogicalPath::new("/sandbox");
        assert_eq!(
            strip_repository(&repo, "/sandbox/a/b.txt"),
            Some(LogicalPath::new("/a/b.txt"))
        );
        assert_eq!(strip_repository(&repo, "/sandbox"), Some(LogicalPath::root()));
        assert_eq!(strip_repository(&repo, "/sandboxed/x"), None);
        assert_eq!(strip_repository(&repo, "/other"), None);
    }
}
