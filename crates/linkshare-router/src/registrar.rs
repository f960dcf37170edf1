/// Route registration
///
/// Walks an endpoint tree once and attaches every valid handler to a router.
///
/// ```text
/// per file:     Discovered → Parsed → Loaded ─┬─ per handler: Validated → Attached
///                                   │         └─ per handler: Rejected (logged, skipped)
///                                   └─ load failure: registration aborts
/// ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::loader::{HandlerCandidate, HandlerLoader, LoadError};
use crate::method::{resolve_method, Verb};
use crate::path::{EndpointDescriptor, PathParser};
use crate::signature::{validate, SignatureError};
use crate::table::{AttachError, Route, RouteSink};
use crate::tree::{EndpointTree, WalkError};

/// Fatal registration failure; the service must not start
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error("failed to load endpoint file {file}: {source}")]
    Load {
        file: PathBuf,
        #[source]
        source: LoadError,
    },
}

/// Why a single handler was skipped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("invalid endpoint signature: {0}")]
    InvalidSignature(#[from] SignatureError),

    #[error(transparent)]
    Attach(#[from] AttachError),
}

/// Terminal state of one handler candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerOutcome {
    Attached {
        file: PathBuf,
        handler: String,
        template: String,
        route_id: String,
        verb: Verb,
        /// The handler name was unrecognized and GET was assumed
        fallback: bool,
    },
    Rejected {
        file: PathBuf,
        handler: String,
        template: String,
        reason: RejectionReason,
    },
}

impl HandlerOutcome {
    pub fn is_attached(&self) -> bool {
        matches!(self, HandlerOutcome::Attached { .. })
    }
}

/// Summary of one registration pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationReport {
    /// Number of handler files walked
    pub files: usize,
    /// One entry per handler candidate, in processing order
    pub outcomes: Vec<HandlerOutcome>,
}

impl RegistrationReport {
    /// Ids of attached routes, in attach order
    pub fn attached_ids(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                HandlerOutcome::Attached { route_id, .. } => Some(route_id.as_str()),
                HandlerOutcome::Rejected { .. } => None,
            })
            .collect()
    }

    /// Rejected handlers with their reasons
    pub fn rejections(&self) -> Vec<(&Path, &str, &RejectionReason)> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                HandlerOutcome::Rejected {
                    file,
                    handler,
                    reason,
                    ..
                } => Some((file.as_path(), handler.as_str(), reason)),
                HandlerOutcome::Attached { .. } => None,
            })
            .collect()
    }

    pub fn attached_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_attached()).count()
    }

    pub fn rejected_count(&self) -> usize {
        self.outcomes.len() - self.attached_count()
    }
}

/// Drives discovery, validation and attachment
#[derive(Debug, Clone)]
pub struct Registrar {
    parser: PathParser,
}

impl Registrar {
    pub fn new(parser: PathParser) -> Self {
        Self { parser }
    }

    pub fn parser(&self) -> &PathParser {
        &self.parser
    }

    /// Register every handler found in `tree` into `sink`
    ///
    /// Per-handler problems (bad signature, duplicate id, router conflict) are
    /// logged and recorded in the report. Walk and load failures abort.
    pub fn register<H, T, L, S>(
        &self,
        tree: &T,
        loader: &L,
        sink: &mut S,
    ) -> Result<RegistrationReport, RegistrationError>
    where
        T: EndpointTree + ?Sized,
        L: HandlerLoader<H> + ?Sized,
        S: RouteSink<H> + ?Sized,
    {
        info!(root = %tree.root().display(), "Starting endpoint registration");

        let files = tree.handler_files()?;
        let mut report = RegistrationReport {
            files: files.len(),
            outcomes: Vec::new(),
        };
        let mut attached_ids = HashSet::new();

        for file in &files {
            debug!(file = %file.display(), "Inspecting endpoint file");

            let descriptor = self.parser.parse(file);

            let candidates = loader.load(file).map_err(|source| {
                error!(file = %file.display(), error = %source, "Failed to load endpoint file");
                RegistrationError::Load {
                    file: file.clone(),
                    source,
                }
            })?;

            if candidates.is_empty() {
                debug!(file = %file.display(), "Endpoint file defines no handlers");
            }

            for candidate in candidates {
                let outcome =
                    self.register_candidate(file, &descriptor, candidate, &mut attached_ids, sink);
                report.outcomes.push(outcome);
            }
        }

        info!(
            files = report.files,
            attached = report.attached_count(),
            rejected = report.rejected_count(),
            "Endpoint registration finished"
        );
        Ok(report)
    }

    fn register_candidate<H, S>(
        &self,
        file: &Path,
        descriptor: &EndpointDescriptor,
        candidate: HandlerCandidate<H>,
        attached_ids: &mut HashSet<String>,
        sink: &mut S,
    ) -> HandlerOutcome
    where
        S: RouteSink<H> + ?Sized,
    {
        let HandlerCandidate {
            name,
            signature,
            handler,
        } = candidate;
        let resolved = resolve_method(&name);

        let rejected = |reason: RejectionReason| HandlerOutcome::Rejected {
            file: file.to_path_buf(),
            handler: name.clone(),
            template: descriptor.template.clone(),
            reason,
        };

        if let Err(err) = validate(&signature, &descriptor.params) {
            error!(
                template = %descriptor.template,
                file = %file.display(),
                handler = %name,
                "Failed to register endpoint, skipping: {}",
                err
            );
            return rejected(err.into());
        }

        let route_id = descriptor.route_id(resolved.verb.id_component());
        if attached_ids.contains(&route_id) {
            warn!(
                route_id = %route_id,
                file = %file.display(),
                handler = %name,
                "Route id already registered, keeping the first registration"
            );
            return rejected(AttachError::DuplicateId { id: route_id }.into());
        }

        let route = Route {
            template: descriptor.template.clone(),
            verb: resolved.verb,
            id: route_id.clone(),
            params: descriptor.params.clone(),
            handler,
        };

        if let Err(err) = sink.attach(route) {
            warn!(
                route_id = %route_id,
                file = %file.display(),
                "Router refused endpoint, skipping: {}",
                err
            );
            return rejected(err.into());
        }

        info!(
            template = %descriptor.template,
            verb = %resolved.verb,
            route_id = %route_id,
            "Registered endpoint"
        );
        attached_ids.insert(route_id.clone());

        HandlerOutcome::Attached {
            file: file.to_path_buf(),
            handler: name,
            template: descriptor.template.clone(),
            route_id,
            verb: resolved.verb,
            fallback: resolved.fallback,
        }
    }
}
