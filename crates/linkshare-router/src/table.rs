/// Registered routes and the router-facing attach interface

use std::collections::HashMap;

use thiserror::Error;

use crate::method::Verb;

/// A validated handler bound to its route
#[derive(Debug, Clone, PartialEq)]
pub struct Route<H> {
    /// URL template like "/api/shares/<share_id>/details"
    pub template: String,
    pub verb: Verb,
    /// Unique key like "shares_share_id_details_get"
    pub id: String,
    /// Parameter names in template order
    pub params: Vec<String>,
    pub handler: H,
}

/// Why a router refused a route
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachError {
    #[error("route id `{id}` is already registered")]
    DuplicateId { id: String },

    #[error("route template `{template}` conflicts with already registered `{existing}`")]
    Conflict { template: String, existing: String },
}

/// Router collaborator the registrar attaches routes to
///
/// Implementations must reject an id that is already attached and keep the
/// first registration; on success the route must be servable.
pub trait RouteSink<H> {
    fn attach(&mut self, route: Route<H>) -> Result<(), AttachError>;
}

/// Plain in-memory route table, in attach order
#[derive(Debug, Clone)]
pub struct RouteTable<H> {
    routes: Vec<Route<H>>,
    by_id: HashMap<String, usize>,
}

impl<H> Default for RouteTable<H> {
    fn default() -> Self {
        Self {
            routes: Vec::new(),
            by_id: HashMap::new(),
        }
    }
}

impl<H> RouteTable<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&Route<H>> {
        self.by_id.get(id).map(|&i| &self.routes[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn routes(&self) -> &[Route<H>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Attached routes, consuming the table
    pub fn into_routes(self) -> Vec<Route<H>> {
        self.routes
    }
}

impl<H> RouteSink<H> for RouteTable<H> {
    fn attach(&mut self, route: Route<H>) -> Result<(), AttachError> {
        if self.by_id.contains_key(&route.id) {
            return Err(AttachError::DuplicateId { id: route.id });
        }

        self.by_id.insert(route.id.clone(), self.routes.len());
        self.routes.push(route);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(id: &str, handler: u8) -> Route<u8> {
        Route {
            template: "/api/x".into(),
            verb: Verb::Get,
            id: id.into(),
            params: vec![],
            handler,
        }
    }

    #[test]
    fn test_first_registration_wins() {
        let mut table = RouteTable::new();
        table.attach(route("x_get", 1)).unwrap();

        let err = table.attach(route("x_get", 2)).unwrap_err();
        assert_eq!(err, AttachError::DuplicateId { id: "x_get".into() });
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("x_get").map(|r| r.handler), Some(1));
    }

    #[test]
    fn test_routes_keep_attach_order() {
        let mut table = RouteTable::new();
        table.attach(route("b_get", 1)).unwrap();
        table.attach(route("a_get", 2)).unwrap();

        let ids: Vec<_> = table.routes().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b_get", "a_get"]);
    }
}
