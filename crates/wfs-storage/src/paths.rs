//! Helpers for the absolute, `/`-separated paths used inside the storage

/// Resolve `path` against the directory `base`.
///
/// Absolute paths ignore `base`. `.` and empty segments are dropped and `..`
/// pops a segment, never climbing above the root.
pub fn resolve(base: &str, path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let joined = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("{base}/{path}")
    };

    for segment in joined.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    format!("/{}", segments.join("/"))
}

/// Parent directory of an absolute path. The root has none.
pub fn parent(path: &str) -> Option<&str> {
    if path == "/" {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some("/"),
        Some(idx) => Some(&path[..idx]),
        None => None,
    }
}

/// Final segment of an absolute path. Empty for the root.
pub fn name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_relative_and_absolute() {
        assert_eq!(resolve("/a", "b/c"), "/a/b/c");
        assert_eq!(resolve("/a", "/x"), "/x");
        assert_eq!(resolve("/", "b"), "/b");
        assert_eq!(resolve("/a/b", "../c"), "/a/c");
        assert_eq!(resolve("/", "../../x"), "/x");
        assert_eq!(resolve("/a", "./b//c/"), "/a/b/c");
        assert_eq!(resolve("/", ""), "/");
    }

    #[test]
    fn parent_and_name() {
        assert_eq!(parent("/a/b"), Some("/a"));
        assert_eq!(parent("/a"), Some("/"));
        assert_eq!(parent("/"), None);
        assert_eq!(name("/a/b.txt"), "b.txt");
        assert_eq!(name("/"), "");
    }
}
