// File: src/app.rs
// Purpose: Register the endpoint tree and assemble the application router

use axum::response::Html;
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use linkshare_router::{PathParser, Registrar, RegistrationError, RegistrationReport};

use crate::config::Config;
use crate::db::Store;
use crate::endpoints;
use crate::routes::{AppState, AxumRouteTable, RouteInfo};

/// Registered application, ready to serve
pub struct Application {
    pub router: Router,
    pub report: RegistrationReport,
    pub routes: Vec<RouteInfo>,
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("routes", &self.routes)
            .finish()
    }
}

/// Register every compiled endpoint and build the router
///
/// Fails when the endpoint tree cannot be walked or a file cannot be loaded;
/// rejected handlers are logged and listed in the report.
pub fn build(config: &Config, store: Store) -> Result<Application, RegistrationError> {
    let registry = endpoints::registry();
    let parser = PathParser::new(endpoints::ENDPOINTS_ROOT).with_prefix(&config.routing.prefix);
    let registrar = Registrar::new(parser);

    let mut table = AxumRouteTable::new();
    let report = registrar.register(&registry, &registry, &mut table)?;

    tracing::info!(
        files = report.files,
        attached = report.attached_count(),
        rejected = report.rejected_count(),
        "endpoint registration finished"
    );

    let routes = table.describe();
    let router = table
        .into_router()
        .route("/", get(index))
        .with_state(AppState { store })
        .layer(TraceLayer::new_for_http());

    Ok(Application {
        router,
        report,
        routes,
    })
}

async fn index() -> Html<&'static str> {
    Html("<p>Hello, World!</p>")
}
