/// Handler loading
///
/// Handler files are compiled in, not executed at startup. A build step (see
/// the `codegen` feature) turns every file under the endpoints root into its
/// own module and records, per file, a factory producing that file's
/// [`HandlerCandidate`]s. [`EndpointRegistry`] is that table: it is both the
/// tree the registrar walks and the loader it asks for handlers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::method::RECOGNIZED_HANDLER_NAMES;
use crate::signature::HandlerSignature;
use crate::tree::{is_handler_file, EndpointTree, WalkError};
use crate::HANDLER_EXTENSION;

/// A handler found in an endpoint file
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerCandidate<H> {
    /// Conventional name, e.g. "get"
    pub name: String,
    pub signature: HandlerSignature,
    pub handler: H,
}

impl<H> HandlerCandidate<H> {
    pub fn new(name: impl Into<String>, signature: HandlerSignature, handler: H) -> Self {
        Self {
            name: name.into(),
            signature,
            handler,
        }
    }
}

/// An endpoint file could not be loaded. Always fatal for registration.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("endpoint file {path} is not part of the compiled endpoint registry")]
    UnknownUnit { path: PathBuf },

    #[error("failed to read endpoint file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse endpoint file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error(transparent)]
    Walk(#[from] WalkError),
}

/// Produces the handler candidates defined by one endpoint file
pub trait HandlerLoader<H> {
    /// Candidates named `get` or `post` defined by `file`. Defining neither is not an error.
    fn load(&self, file: &Path) -> Result<Vec<HandlerCandidate<H>>, LoadError>;
}

/// Builds the candidates of one compiled endpoint file
pub type UnitFactory<H> = fn() -> Vec<HandlerCandidate<H>>;

/// Explicit table of compiled endpoint files
pub struct EndpointRegistry<H> {
    root: PathBuf,
    units: BTreeMap<PathBuf, UnitFactory<H>>,
}

impl<H> EndpointRegistry<H> {
    /// Empty registry for files under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            units: BTreeMap::new(),
        }
    }

    /// Register the file at `relative` (to the root, with extension)
    pub fn unit(mut self, relative: impl AsRef<Path>, factory: UnitFactory<H>) -> Self {
        self.units.insert(relative.as_ref().to_path_buf(), factory);
        self
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    fn factory_for(&self, file: &Path) -> Option<UnitFactory<H>> {
        let relative = file.strip_prefix(&self.root).unwrap_or(file);
        self.units.get(relative).copied()
    }
}

impl<H> std::fmt::Debug for EndpointRegistry<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointRegistry")
            .field("root", &self.root)
            .field("units", &self.units.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<H> EndpointTree for EndpointRegistry<H> {
    fn root(&self) -> &Path {
        &self.root
    }

    fn handler_files(&self) -> Result<Vec<PathBuf>, WalkError> {
        // BTreeMap keys are already in path order
        Ok(self
            .units
            .keys()
            .filter(|rel| is_handler_file(rel, HANDLER_EXTENSION))
            .map(|rel| self.root.join(rel))
            .collect())
    }
}

impl<H> HandlerLoader<H> for EndpointRegistry<H> {
    fn load(&self, file: &Path) -> Result<Vec<HandlerCandidate<H>>, LoadError> {
        let factory = self.factory_for(file).ok_or_else(|| LoadError::UnknownUnit {
            path: file.to_path_buf(),
        })?;

        // Each call builds fresh candidates; nothing is shared between files.
        Ok(factory()
            .into_iter()
            .filter(|c| RECOGNIZED_HANDLER_NAMES.contains(&c.name.as_str()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::HandlerArg;

    fn details_unit() -> Vec<HandlerCandidate<u8>> {
        vec![
            HandlerCandidate::new(
                "get",
                HandlerSignature::new(vec![HandlerArg::required("share_id")]),
                1,
            ),
            HandlerCandidate::new("helper", HandlerSignature::empty(), 2),
        ]
    }

    #[test]
    fn test_load_filters_unrecognized_names() {
        let registry = EndpointRegistry::new("/ep").unit("shares/_share_id/details.rs", details_unit);
        let loaded = registry
            .load(Path::new("/ep/shares/_share_id/details.rs"))
            .unwrap();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "get");
        assert_eq!(loaded[0].handler, 1);
    }

    #[test]
    fn test_file_without_handlers_is_not_an_error() {
        let registry: EndpointRegistry<u8> = EndpointRegistry::new("/ep").unit("empty.rs", Vec::new);
        assert!(registry.load(Path::new("/ep/empty.rs")).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_file_fails_to_load() {
        let registry: EndpointRegistry<u8> = EndpointRegistry::new("/ep");
        let err = registry.load(Path::new("/ep/missing.rs")).unwrap_err();
        assert!(matches!(err, LoadError::UnknownUnit { .. }));
    }

    #[test]
    fn test_tree_yields_root_joined_sorted_handler_files() {
        let registry: EndpointRegistry<u8> = EndpointRegistry::new("/ep")
            .unit("shares/list.rs", Vec::new)
            .unit("notes.txt", Vec::new)
            .unit("shares/details.rs", Vec::new);

        let files = registry.handler_files().unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("/ep/shares/details.rs"),
                PathBuf::from("/ep/shares/list.rs"),
            ]
        );
    }
}
