/// File path → route template conversion
///
/// Pure transformation from a handler file's location under the endpoints
/// root into the route it serves. Nothing here can fail: a file that cannot be
/// expressed relative to the root is still parsed, from its raw components,
/// after a warning.

use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::{DEFAULT_PREFIX, ID_DELIMITER, PARAM_MARKER};

/// Route shape derived from one handler file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    /// URL template like "/api/shares/<share_id>/details"
    pub template: String,
    /// Marker-stripped segments joined by `_`, e.g. "shares_share_id_details"
    pub id_prefix: String,
    /// Parameter names in path order (not deduplicated)
    pub params: Vec<String>,
    /// False when the file was outside the endpoints root and the raw path was used
    pub relative_to_root: bool,
}

impl EndpointDescriptor {
    /// Route id for this endpoint served under `verb_id` (e.g. "get")
    pub fn route_id(&self, verb_id: &str) -> String {
        format!("{}{}{}", self.id_prefix, ID_DELIMITER, verb_id)
    }
}

/// Fold accumulator for segment-by-segment parsing
#[derive(Default)]
struct ParseState {
    template_parts: Vec<String>,
    id_parts: Vec<String>,
    params: Vec<String>,
}

impl ParseState {
    fn with_literal(mut self, segment: &str) -> Self {
        self.template_parts.push(segment.to_string());
        self.id_parts.push(segment.to_string());
        self
    }

    fn with_param(mut self, name: &str) -> Self {
        self.template_parts.push(format!("<{}>", name));
        self.id_parts.push(name.to_string());
        self.params.push(name.to_string());
        self
    }
}

/// Converts handler file paths into [`EndpointDescriptor`]s
#[derive(Debug, Clone)]
pub struct PathParser {
    root: PathBuf,
    prefix: String,
    marker: char,
}

impl PathParser {
    /// Parser for files under `root`, using the `/api/` prefix and `_` marker
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            prefix: DEFAULT_PREFIX.to_string(),
            marker: PARAM_MARKER,
        }
    }

    /// Use a different template prefix. A missing leading or trailing `/` is added.
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        let trimmed = prefix.trim_matches('/');
        self.prefix = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{}/", trimmed)
        };
        self
    }

    /// Use a different parameter marker character
    pub fn with_marker(mut self, marker: char) -> Self {
        self.marker = marker;
        self
    }

    /// Endpoints root this parser resolves paths against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Template prefix, always with leading and trailing `/`
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Parse a handler file path (absolute, or already joined with the root)
    pub fn parse(&self, path: &Path) -> EndpointDescriptor {
        let stem = path.with_extension("");

        let (relative, relative_to_root) = match stem.strip_prefix(&self.root) {
            Ok(rel) => (rel.to_path_buf(), true),
            Err(_) => {
                warn!(
                    file = %path.display(),
                    root = %self.root.display(),
                    "Could not express endpoint file relative to the endpoints root, using raw path"
                );
                (stem.clone(), false)
            }
        };

        let segments: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        let descriptor = self.parse_segments(&segments, relative_to_root);
        debug!(
            template = %descriptor.template,
            file = %path.display(),
            "Endpoint template obtained from file"
        );
        descriptor
    }

    /// Parse a `/`-separated path that is already relative to the root, extension removed
    pub fn parse_relative(&self, relative: &str) -> EndpointDescriptor {
        let segments: Vec<String> = relative
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        self.parse_segments(&segments, true)
    }

    fn parse_segments(&self, segments: &[String], relative_to_root: bool) -> EndpointDescriptor {
        let state = segments
            .iter()
            .fold(ParseState::default(), |state, segment| {
                match segment.strip_prefix(self.marker) {
                    Some(name) => state.with_param(name),
                    None => state.with_literal(segment),
                }
            });

        EndpointDescriptor {
            template: format!("{}{}", self.prefix, state.template_parts.join("/")),
            id_prefix: state.id_parts.join(&ID_DELIMITER.to_string()),
            params: state.params,
            relative_to_root,
        }
    }
}
