/// Endpoint tree traversal
///
/// An [`EndpointTree`] yields the handler files below its root. [`FsTree`]
/// walks a real directory; the generated [`crate::EndpointRegistry`] yields the
/// files that were compiled into the binary.

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

use crate::HANDLER_EXTENSION;

/// The endpoints root could not be walked
#[derive(Debug, Error)]
#[error("failed to walk endpoint tree {root}: {message}")]
pub struct WalkError {
    pub root: PathBuf,
    pub message: String,
}

/// Source of handler files for one registration pass
pub trait EndpointTree {
    /// Directory the handler files live under
    fn root(&self) -> &Path;

    /// Every handler file, as `root`-joined paths, sorted
    fn handler_files(&self) -> Result<Vec<PathBuf>, WalkError>;
}

/// Whether `path` carries the handler file extension
pub fn is_handler_file(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some(extension)
}

/// Recursive directory walk over an endpoints root on disk
#[derive(Debug, Clone)]
pub struct FsTree {
    root: PathBuf,
    extension: String,
}

impl FsTree {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: HANDLER_EXTENSION.to_string(),
        }
    }

    /// Only yield files with this extension (without the dot)
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }
}

impl EndpointTree for FsTree {
    fn root(&self) -> &Path {
        &self.root
    }

    fn handler_files(&self) -> Result<Vec<PathBuf>, WalkError> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(|e| WalkError {
                root: self.root.clone(),
                message: e.to_string(),
            })?;

            if entry.file_type().is_file() && is_handler_file(entry.path(), &self.extension) {
                files.push(entry.into_path());
            } else {
                tracing::trace!(path = %entry.path().display(), "Skipping non-handler entry");
            }
        }

        files.sort();
        Ok(files)
    }
}
