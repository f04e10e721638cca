use std::path::{Path, PathBuf};

use tracing::trace;


/// Turns relative paths found in the configuration into absolute ones.
///
/// Relative paths are anchored at the directory containing the configuration
/// file. Existence is only ever checked when the search path is consulted.
#[derive(Debug, Clone)]
pub struct PathResolver {
    base_directory: PathBuf,
    search_paths: Vec<PathBuf>,
}

impl PathResolver {
    pub fn new<P: Into<PathBuf>>(base_directory: P) -> Self {
        Self {
            base_directory: base_directory.into(),
            search_paths: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_search_paths(mut self, search_paths: Vec<PathBuf>) -> Self {
        self.search_paths = search_paths;
        self
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Resolve `path` against the base directory.
    ///
    /// Absolute paths are returned unchanged. If `use_search_path` is set and
    /// the base-directory form does not exist, each search path is tried in
    /// order; the first existing candidate wins. Otherwise the base-directory
    /// form is returned.
    pub fn resolve<P: AsRef<Path>>(&self, path: P, use_search_path: bool) -> PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            return path.to_path_buf();
        }

        let anchored = self.base_directory.join(path);
        if !use_search_path || anchored.exists() {
            return anchored;
        }

        for search_path in &self.search_paths {
            let candidate = search_path.join(path);
            if candidate.exists() {
                trace!(
                    path = %path.display(),
                    candidate = %candidate.display(),
                    "Resolved path through search path."
                );
                return candidate;
            }
        }

        anchored
    }
}


#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn relative_path_is_anchored_at_base_directory() {
        let resolver = PathResolver::new("/etc/backup");

        assert_eq!(
            resolver.resolve("backup", false),
            PathBuf::from("/etc/backup/backup")
        );
        assert_eq!(
            resolver.resolve("./logs/run.json", false),
            PathBuf::from("/etc/backup/./logs/run.json")
        );
    }

    #[test]
    fn absolute_path_is_unchanged_and_resolution_is_idempotent() {
        let resolver = PathResolver::new("/etc/backup");

        let once = resolver.resolve("/var/backups", false);
        assert_eq!(once, PathBuf::from("/var/backups"));

        let relative_once = resolver.resolve("dumps", false);
        assert_eq!(resolver.resolve(&relative_once, false), relative_once);
    }

    #[test]
    fn search_path_is_used_when_missing_under_base_directory() {
        let base = tempfile::tempdir().unwrap();
        let shared = tempfile::tempdir().unwrap();
        fs::write(shared.path().join("bootstrap.php"), "").unwrap();

        let resolver = PathResolver::new(base.path())
            .with_search_paths(vec![PathBuf::from("/nonexistent"), shared.path().to_path_buf()]);

        assert_eq!(
            resolver.resolve("bootstrap.php", true),
            shared.path().join("bootstrap.php")
        );
        assert_eq!(
            resolver.resolve("bootstrap.php", false),
            base.path().join("bootstrap.php")
        );
    }

    #[test]
    fn base_directory_wins_over_search_path() {
        let base = tempfile::tempdir().unwrap();
        let shared = tempfile::tempdir().unwrap();
        fs::write(base.path().join("bootstrap.php"), "").unwrap();
        fs::write(shared.path().join("bootstrap.php"), "").unwrap();

        let resolver =
            PathResolver::new(base.path()).with_search_paths(vec![shared.path().to_path_buf()]);

        assert_eq!(
            resolver.resolve("bootstrap.php", true),
            base.path().join("bootstrap.php")
        );
    }

    #[test]
    fn unresolvable_search_falls_back_to_base_directory() {
        let resolver = PathResolver::new("/etc/backup")
            .with_search_paths(vec![PathBuf::from("/nonexistent-search-path")]);

        assert_eq!(
            resolver.resolve("missing.php", true),
            PathBuf::from("/etc/backup/missing.php")
        );
    }
}
