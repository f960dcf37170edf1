// File: src/handler.rs
// Purpose: Type-erased endpoint handlers and the route arguments they are called with

use axum::response::{IntoResponse, Response};
use std::borrow::Cow;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::EndpointContext;
use crate::error::ApiError;

/// Boxed future returned by a handler
pub type HandlerFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// A compiled endpoint function behind a uniform call shape
pub type Handler = Arc<dyn Fn(EndpointContext, RouteArgs) -> HandlerFuture + Send + Sync>;

/// Wrap an endpoint call into a [`Handler`]
///
/// Errors (including missing or malformed route arguments) become responses
/// through [`ApiError`]'s `IntoResponse`.
pub fn handler<F, Fut, R>(f: F) -> Handler
where
    F: Fn(EndpointContext, RouteArgs) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, ApiError>> + Send + 'static,
    R: IntoResponse,
{
    Arc::new(move |ctx, args| {
        let fut = f(ctx, args);
        Box::pin(async move {
            match fut.await {
                Ok(response) => response.into_response(),
                Err(e) => e.into_response(),
            }
        })
    })
}

// ============================================================================
// Route arguments
// ============================================================================

/// Parameter values captured from the matched route, by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteArgs {
    values: HashMap<String, String>,
}

impl RouteArgs {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Remove the value captured for `name` and convert it
    pub fn take<T: FromRouteArg>(&mut self, name: &str) -> Result<T, ApiError> {
        T::from_route_arg(name, self.values.remove(name))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Conversion from a captured route value into a handler argument
///
/// `raw` is `None` when the route did not capture `name`. Registration only
/// attaches handlers whose arguments are text (or defaulted), so the parsing
/// impls below only serve handlers that were rejected at startup.
pub trait FromRouteArg: Sized {
    fn from_route_arg(name: &str, raw: Option<String>) -> Result<Self, ApiError>;
}

fn missing(name: &str) -> ApiError {
    ApiError::BadRequest(format!("missing route argument `{}`", name))
}

impl FromRouteArg for String {
    fn from_route_arg(name: &str, raw: Option<String>) -> Result<Self, ApiError> {
        raw.ok_or_else(|| missing(name))
    }
}

impl FromRouteArg for Box<str> {
    fn from_route_arg(name: &str, raw: Option<String>) -> Result<Self, ApiError> {
        String::from_route_arg(name, raw).map(String::into_boxed_str)
    }
}

impl FromRouteArg for Cow<'static, str> {
    fn from_route_arg(name: &str, raw: Option<String>) -> Result<Self, ApiError> {
        String::from_route_arg(name, raw).map(Cow::Owned)
    }
}

impl<T: FromRouteArg> FromRouteArg for Option<T> {
    fn from_route_arg(name: &str, raw: Option<String>) -> Result<Self, ApiError> {
        match raw {
            None => Ok(None),
            Some(value) => T::from_route_arg(name, Some(value)).map(Some),
        }
    }
}

macro_rules! parsed_route_arg {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromRouteArg for $ty {
                fn from_route_arg(name: &str, raw: Option<String>) -> Result<Self, ApiError> {
                    let raw = String::from_route_arg(name, raw)?;
                    raw.parse().map_err(|_| {
                        ApiError::BadRequest(format!("invalid value for `{}`: {}", name, raw))
                    })
                }
            }
        )*
    };
}

parsed_route_arg!(i32, i64, u32, u64, usize, bool, uuid::Uuid);
