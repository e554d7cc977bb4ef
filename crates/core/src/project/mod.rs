//! Project root detection

use crate::impl_case_insensitive_deserialize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

pub const DEFAULT_MANIFEST: &str = "package.json";

/// How many directory levels the root search climbs per step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ascent {
    Single,
    /// Climb two levels per step. Directories at odd distances from the
    /// starting directory are never checked.
    #[default]
    Double,
}

impl_case_insensitive_deserialize!(
    Ascent,
    Single => "single",
    Double => "double"
);

impl Ascent {
    fn levels(self) -> usize {
        match self {
            Ascent::Single => 1,
            Ascent::Double => 2,
        }
    }
}

pub trait RootLocator: Send + Sync {
    /// Directory the runner should be started in for `path`.
    ///
    /// Falls back to `default_dir` when no project root is found.
    fn locate(&self, path: &Path, default_dir: &Path) -> PathBuf;
}

/// Finds the nearest directory holding a manifest file such as `package.json`.
#[derive(Debug, Clone)]
pub struct ManifestRootLocator {
    manifest: String,
    ascent: Ascent,
}

impl Default for ManifestRootLocator {
    fn default() -> Self {
        Self::new(DEFAULT_MANIFEST, Ascent::default())
    }
}

impl ManifestRootLocator {
    pub fn new(manifest: impl Into<String>, ascent: Ascent) -> Self {
        Self {
            manifest: manifest.into(),
            ascent,
        }
    }

    fn step_up(&self, dir: &Path) -> PathBuf {
        let mut next = dir;
        for _ in 0..self.ascent.levels() {
            match next.parent() {
                Some(parent) => next = parent,
                None => break,
            }
        }
        next.to_path_buf()
    }
}

impl RootLocator for ManifestRootLocator {
    fn locate(&self, path: &Path, default_dir: &Path) -> PathBuf {
        let path = if path.is_relative() {
            default_dir.join(path)
        } else {
            path.to_path_buf()
        };

        let mut candidate = if path.is_dir() {
            path
        } else {
            match path.parent() {
                Some(parent) => parent.to_path_buf(),
                None => path,
            }
        };

        loop {
            trace!("Looking in {:?} for {}", candidate, self.manifest);
            if candidate.join(&self.manifest).exists() {
                debug!("Project root: {:?}", candidate);
                return candidate;
            }
            if candidate.parent().is_none() {
                debug!(
                    "No {} found, falling back to {:?}",
                    self.manifest, default_dir
                );
                return default_dir.to_path_buf();
            }
            candidate = self.step_up(&candidate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_manifest_next_to_file() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("app");
        touch(&root.join("package.json"));
        touch(&root.join("sum.test.js"));

        let locator = ManifestRootLocator::default();
        assert_eq!(
            locator.locate(&root.join("sum.test.js"), Path::new("/fallback")),
            root
        );
    }

    #[test]
    fn test_double_ascent_visits_every_other_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("app");
        touch(&root.join("package.json"));
        let file = root.join("src/components/button.test.tsx");
        touch(&file);

        // src/components -> app
        let locator = ManifestRootLocator::default();
        assert_eq!(locator.locate(&file, Path::new("/fallback")), root);
    }

    #[test]
    fn test_double_ascent_skips_odd_levels() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("app");
        touch(&root.join("package.json"));
        let file = root.join("src/sum.test.js");
        touch(&file);

        // src -> temp_dir, so app is stepped over
        let double = ManifestRootLocator::default();
        assert_ne!(double.locate(&file, Path::new("/fallback")), root);

        let single = ManifestRootLocator::new(DEFAULT_MANIFEST, Ascent::Single);
        assert_eq!(single.locate(&file, Path::new("/fallback")), root);
    }

    #[test]
    fn test_directory_argument_is_checked_itself() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("app");
        touch(&root.join("package.json"));

        let locator = ManifestRootLocator::default();
        assert_eq!(locator.locate(&root, Path::new("/fallback")), root);
    }

    #[test]
    fn test_falls_back_to_default_without_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a/b/c/sum.test.js");
        touch(&file);

        let locator = ManifestRootLocator::new("jest-runner-test-manifest.json", Ascent::Single);
        assert_eq!(
            locator.locate(&file, Path::new("/fallback")),
            PathBuf::from("/fallback")
        );
    }

    #[test]
    fn test_double_ascent_falls_back_after_reaching_root() {
        let temp_dir = TempDir::new().unwrap();
        let mut even = temp_dir.path().join("a/b");
        // an even distance to `/` makes the last double step land exactly on it
        if (even.components().count() - 1) % 2 == 1 {
            even.push("c");
        }
        let odd = even.join("d");
        touch(&even.join("sum.test.js"));
        touch(&odd.join("sum.test.js"));

        let locator = ManifestRootLocator::new("jest-runner-test-manifest.json", Ascent::Double);
        for dir in [&even, &odd] {
            assert_eq!(
                locator.locate(&dir.join("sum.test.js"), Path::new("/fallback")),
                PathBuf::from("/fallback"),
                "{dir:?}"
            );
        }
    }

    #[test]
    fn test_relative_path_resolved_against_default() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().to_path_buf();
        touch(&root.join("package.json"));
        touch(&root.join("lib/util/sum.test.js"));

        let locator = ManifestRootLocator::default();
        assert_eq!(
            locator.locate(Path::new("lib/util/sum.test.js"), &root),
            root
        );
    }

    #[test]
    fn test_custom_manifest_name() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("deno");
        touch(&root.join("deno.json"));
        touch(&root.join("mod.test.ts"));

        let locator = ManifestRootLocator::new("deno.json", Ascent::Double);
        assert_eq!(
            locator.locate(&root.join("mod.test.ts"), Path::new("/fallback")),
            root
        );
    }

    #[test]
    fn test_ascent_deserializes_case_insensitively() {
        let ascent: Ascent = serde_json::from_str(r#""Single""#).unwrap();
        assert_eq!(ascent, Ascent::Single);
        assert_eq!(serde_json::to_string(&Ascent::Double).unwrap(), r#""double""#);
    }
}
