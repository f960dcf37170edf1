//! # LinkShare Server
//!
//! Serves files by share id. Every file under `src/endpoints` is compiled into
//! the crate by `build.rs` and registered at startup by `linkshare-router`:
//!
//! ```text
//! src/endpoints/shares/list.rs                → GET  /api/shares/list
//! src/endpoints/shares/details.rs             → GET  /api/shares/details
//! src/endpoints/shares/new.rs                 → POST /api/shares/new
//! src/endpoints/shares/_share_id/details.rs   → GET  /api/shares/<share_id>/details
//! src/endpoints/shares/_share_id/download.rs  → GET  /api/shares/<share_id>/download
//! ```

pub mod app;
pub mod config;
pub mod context;
pub mod db;
pub mod endpoints;
pub mod error;
pub mod handler;
pub mod logging;
pub mod routes;
pub mod share;

pub use app::{build, Application};
pub use config::Config;
pub use context::{EndpointContext, FormData, QueryParams};
pub use db::Store;
pub use error::ApiError;
pub use handler::{handler, FromRouteArg, Handler, RouteArgs};
pub use share::Share;
