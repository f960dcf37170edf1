//! # LinkShare Router
//!
//! Convention-based route discovery for the LinkShare API:
//! - Every handler file under the endpoints tree becomes a route (`shares/list.rs` → `/api/shares/list`)
//! - Every `_`-prefixed segment becomes a parameter (`shares/_share_id/details.rs` → `/api/shares/<share_id>/details`)
//! - Every function named `get` or `post` inside the file becomes the handler for that verb
//!
//! ## Pipeline
//!
//! ```text
//! EndpointTree::handler_files()      (walk, filter by extension)
//!     → PathParser::parse()          (template, id prefix, params; never fails)
//!     → HandlerLoader::load()        (candidates; failure aborts registration)
//!     → resolve_method()             (get → GET, post → POST, other → GET + warning)
//!     → validate()                   (params vs. declared handler arguments)
//!     → RouteSink::attach()          (first id wins)
//! ```
//!
//! Registration runs once, before serving. The resulting table is never mutated.
//!
//! ## Example
//!
//! ```
//! use linkshare_router::{
//!     EndpointRegistry, HandlerArg, HandlerCandidate, HandlerSignature, PathParser, Registrar,
//!     RouteTable, Verb,
//! };
//!
//! let registry = EndpointRegistry::<&str>::new("endpoints").unit("shares/_share_id/details.rs", || {
//!     vec![HandlerCandidate::new(
//!         "get",
//!         HandlerSignature::new(vec![HandlerArg::required("share_id")]),
//!         "details handler",
//!     )]
//! });
//!
//! let registrar = Registrar::new(PathParser::new("endpoints"));
//! let mut table = RouteTable::new();
//! registrar.register(&registry, &registry, &mut table).unwrap();
//!
//! let route = table.get("shares_share_id_details_get").unwrap();
//! assert_eq!(route.template, "/api/shares/<share_id>/details");
//! assert_eq!(route.verb, Verb::Get);
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod loader;
pub mod method;
pub mod path;
pub mod registrar;
pub mod signature;
pub mod table;
pub mod tree;

#[cfg(feature = "codegen")]
pub mod codegen;

pub use loader::{EndpointRegistry, HandlerCandidate, HandlerLoader, LoadError, UnitFactory};
pub use method::{resolve_method, ResolvedMethod, Verb, RECOGNIZED_HANDLER_NAMES};
pub use path::{EndpointDescriptor, PathParser};
pub use registrar::{
    HandlerOutcome, Registrar, RegistrationError, RegistrationReport, RejectionReason,
};
pub use signature::{is_text_type, validate, HandlerArg, HandlerSignature, SignatureError};
pub use table::{AttachError, Route, RouteSink, RouteTable};
pub use tree::{EndpointTree, FsTree, WalkError};

// ============================================================================
// Conventions
// ============================================================================

/// Prefix every route template starts with
pub const DEFAULT_PREFIX: &str = "/api/";

/// Leading character that turns a path segment into a route parameter
pub const PARAM_MARKER: char = '_';

/// Separator between the components of a route id
pub const ID_DELIMITER: char = '_';

/// Extension of handler files inside the endpoints tree
pub const HANDLER_EXTENSION: &str = "rs";
