//! Template path resolution.
//!
//! Lookup order for a requested name:
//!
//! 1. absolute names are returned unchanged;
//! 2. each search directory, in registration order, first hit on disk wins;
//! 3. otherwise the name is joined onto the directory of the including file,
//!    without an existence check, so the subsequent read reports not-found.

use std::path::{Path, PathBuf};

/// Ordered, append-only list of template search directories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateResolver {
    dirs: Vec<PathBuf>,
}

impl TemplateResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Append a search directory. Earlier directories keep priority.
    pub fn add_directory(&mut self, dir: impl Into<PathBuf>) {
        self.dirs.push(dir.into());
    }

    pub fn directories(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Resolve `name` as requested from the template at `base`.
    ///
    /// `base` is the path of the including template, or empty for a
    /// top-level lookup.
    pub fn resolve(&self, base: &Path, name: &str) -> PathBuf {
        let requested = Path::new(name);
        if requested.is_absolute() {
            return requested.to_path_buf();
        }

        for dir in &self.dirs {
            let candidate = dir.join(requested);
            if candidate.exists() {
                tracing::debug!(name, path = %candidate.display(), "template found in search directory");
                return candidate;
            }
        }

        match base.parent() {
            Some(parent) => parent.join(requested),
            None => requested.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x").unwrap();
    }

    #[test]
    fn absolute_name_is_returned_unchanged() {
        let tmp = TempDir::new().unwrap();
        let shadow = tmp.path().join("etc").join("page.html");
        touch(&shadow);
        let resolver = TemplateResolver::with_dirs([tmp.path().to_path_buf()]);

        let absolute = tmp.path().join("elsewhere").join("page.html");
        let name = absolute.to_str().unwrap();
        assert_eq!(resolver.resolve(Path::new("base.html"), name), absolute);
        assert_eq!(TemplateResolver::new().resolve(Path::new(""), name), absolute);
    }

    #[test]
    fn first_registered_directory_wins() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        touch(&first.path().join("test.html"));
        touch(&second.path().join("test.html"));
        touch(&second.path().join("only_second.html"));

        let mut resolver = TemplateResolver::new();
        resolver.add_directory(first.path());
        resolver.add_directory(second.path());

        assert_eq!(
            resolver.resolve(Path::new(""), "test.html"),
            first.path().join("test.html")
        );
        assert_eq!(
            resolver.resolve(Path::new(""), "only_second.html"),
            second.path().join("only_second.html")
        );
    }

    #[test]
    fn nested_names_are_searched_under_directories() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("partials").join("nav.html"));
        let resolver = TemplateResolver::with_dirs([tmp.path()]);

        assert_eq!(
            resolver.resolve(Path::new(""), "partials/nav.html"),
            tmp.path().join("partials").join("nav.html")
        );
    }

    #[test]
    fn missing_name_falls_back_to_base_directory_without_checking() {
        let tmp = TempDir::new().unwrap();
        let resolver = TemplateResolver::with_dirs([tmp.path()]);
        let base = Path::new("/srv/site/pages/index.html");

        assert_eq!(
            resolver.resolve(base, "missing.html"),
            PathBuf::from("/srv/site/pages/missing.html")
        );
    }

    #[test]
    fn empty_base_falls_back_to_bare_name() {
        let resolver = TemplateResolver::new();
        assert_eq!(
            resolver.resolve(Path::new(""), "nowhere/test.html"),
            PathBuf::from("nowhere/test.html")
        );
    }
}
