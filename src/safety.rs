use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directories inside a project that patching must never touch: generated
/// output and vendored dependency trees.
const GENERATED_DIRS: &[&str] = &["node_modules", "build", "dist", ".cache"];

/// Safety checks to keep edits inside the target project.
///
/// The target document is generated application source that lives somewhere
/// under the project root; anything outside it, or inside a generated or
/// vendored tree, is off limits.
#[derive(Debug, Clone)]
pub struct ProjectGuard {
    /// Absolute path to the project root
    project_root: PathBuf,
    /// Canonical paths to forbidden directories
    forbidden_paths: Vec<PathBuf>,
}

#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("target is outside project: {path} (project: {project})")]
    OutsideProject { path: PathBuf, project: PathBuf },

    #[error("target is in forbidden directory: {path} (forbidden: {forbidden})")]
    ForbiddenPath { path: PathBuf, forbidden: PathBuf },

    #[error("failed to canonicalize path: {0}")]
    Canonicalize(#[from] std::io::Error),
}

impl ProjectGuard {
    /// Create a guard rooted at `project_root`.
    ///
    /// The root is canonicalized so symlinked checkouts behave.
    pub fn new(project_root: impl AsRef<Path>) -> Result<Self, SafetyError> {
        let project_root = project_root.as_ref().canonicalize()?;

        let mut forbidden_paths = Vec::new();

        for dir in GENERATED_DIRS {
            if let Ok(path) = project_root.join(dir).canonicalize() {
                forbidden_paths.push(path);
            }
        }

        // Global package caches, in case the project root was pointed at a
        // directory that contains them.
        if let Some(home) = home::home_dir() {
            for dir in [".npm", ".cache", ".yarn"] {
                if let Ok(path) = home.join(dir).canonicalize() {
                    forbidden_paths.push(path);
                }
            }
        }

        Ok(Self {
            project_root,
            forbidden_paths,
        })
    }

    /// Check that a target document is safe to rewrite.
    ///
    /// Returns the canonicalized absolute path if safe. Relative paths are
    /// resolved against the project root.
    pub fn validate_target(&self, path: impl AsRef<Path>) -> Result<PathBuf, SafetyError> {
        let path = path.as_ref();

        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        };

        // Canonicalize to resolve symlinks and .. components
        let canonical = absolute.canonicalize()?;

        if !canonical.starts_with(&self.project_root) {
            return Err(SafetyError::OutsideProject {
                path: canonical,
                project: self.project_root.clone(),
            });
        }

        for forbidden in &self.forbidden_paths {
            if canonical.starts_with(forbidden) {
                return Err(SafetyError::ForbiddenPath {
                    path: canonical,
                    forbidden: forbidden.clone(),
                });
            }
        }

        Ok(canonical)
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Create a guard with custom forbidden paths (for testing).
    #[cfg(test)]
    pub fn with_forbidden(
        project_root: impl AsRef<Path>,
        forbidden: Vec<PathBuf>,
    ) -> Result<Self, SafetyError> {
        let project_root = project_root.as_ref().canonicalize()?;
        Ok(Self {
            project_root,
            forbidden_paths: forbidden,
        })
    }
}
