// File: src/routes.rs
// Purpose: Route sink that collects registered routes and turns them into an axum Router

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Method, Uri};
use axum::response::Response;
use axum::routing::{MethodFilter, MethodRouter};
use axum::Router;
use std::collections::{BTreeMap, HashMap};

use linkshare_router::{AttachError, Route, RouteSink, RouteTable, Verb};

use crate::context::EndpointContext;
use crate::db::Store;
use crate::handler::{Handler, RouteArgs};

/// State shared with every endpoint
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Store,
}

/// One attached route, for listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub verb: Verb,
    pub template: String,
    pub id: String,
}

/// `/api/shares/<share_id>/details` → `/api/shares/:share_id/details`
pub fn axum_path(template: &str) -> String {
    template
        .split('/')
        .map(|segment| match segment.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
            Some(name) => format!(":{}", name),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Template with parameter names erased; two templates with the same shape
/// but different names cannot live in one router
fn shape(template: &str) -> String {
    template
        .split('/')
        .map(|segment| if segment.starts_with('<') { "<>" } else { segment })
        .collect::<Vec<_>>()
        .join("/")
}

/// Route table backed by axum
#[derive(Default)]
pub struct AxumRouteTable {
    table: RouteTable<Handler>,
    shapes: HashMap<String, String>,
}

impl AxumRouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Attached routes in registration order
    pub fn describe(&self) -> Vec<RouteInfo> {
        self.table
            .routes()
            .iter()
            .map(|route| RouteInfo {
                verb: route.verb,
                template: route.template.clone(),
                id: route.id.clone(),
            })
            .collect()
    }

    /// Build the router; one axum route per template, one method per verb
    pub fn into_router(self) -> Router<AppState> {
        let mut by_path: BTreeMap<String, MethodRouter<AppState>> = BTreeMap::new();

        for route in self.table.into_routes() {
            let filter = match route.verb {
                Verb::Get => MethodFilter::GET,
                Verb::Post => MethodFilter::POST,
            };
            let endpoint = endpoint(route.handler);
            let path = axum_path(&route.template);

            let method_router = match by_path.remove(&path) {
                Some(existing) => existing.on(filter, endpoint),
                None => axum::routing::on(filter, endpoint),
            };
            by_path.insert(path, method_router);
        }

        by_path
            .into_iter()
            .fold(Router::new(), |router, (path, method_router)| {
                router.route(&path, method_router)
            })
    }
}

impl RouteSink<Handler> for AxumRouteTable {
    fn attach(&mut self, route: Route<Handler>) -> Result<(), AttachError> {
        let route_shape = shape(&route.template);
        if let Some(existing) = self.shapes.get(&route_shape) {
            if existing != &route.template {
                return Err(AttachError::Conflict {
                    template: route.template,
                    existing: existing.clone(),
                });
            }
        }

        let template = route.template.clone();
        self.table.attach(route)?;
        self.shapes.entry(route_shape).or_insert(template);
        Ok(())
    }
}

/// axum handler calling `handler` with a context built from the request
fn endpoint(
    handler: Handler,
) -> impl Fn(
    State<AppState>,
    Method,
    Uri,
    Option<Path<HashMap<String, String>>>,
    Query<HashMap<String, String>>,
    HeaderMap,
    Bytes,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Response> + Send>>
       + Clone
       + Send
       + Sync
       + 'static {
    move |State(state), method, uri, params, Query(query), headers, body| {
        let handler = handler.clone();
        Box::pin(async move {
            let ctx = EndpointContext::from_request(
                state.store,
                method,
                uri.path().to_string(),
                query,
                headers,
                &body,
            );
            let args = RouteArgs::new(params.map(|Path(p)| p).unwrap_or_default());
            handler(ctx, args).await
        })
    }
}
