// File: src/context.rs
// Purpose: Context handed to endpoint handlers: store handle, query params, form data

use axum::http::{header, HeaderMap, Method};
use serde_json::Value as JsonValue;
use std::collections::HashMap;

use crate::db::Store;

/// Context passed to endpoint handlers that declare an `EndpointContext` argument
#[derive(Clone)]
pub struct EndpointContext {
    /// HTTP method (GET, POST)
    pub method: Method,

    /// Request path
    pub path: String,

    /// Query parameters from URL (?key=value)
    pub query: QueryParams,

    /// Form data from POST requests
    pub form: FormData,

    /// Request headers
    pub headers: HeaderMap,

    /// Share database
    pub store: Store,
}

impl std::fmt::Debug for EndpointContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointContext")
            .field("method", &self.method)
            .field("path", &self.path)
            .finish()
    }
}

impl EndpointContext {
    pub fn new(
        store: Store,
        method: Method,
        path: String,
        query: QueryParams,
        form: FormData,
        headers: HeaderMap,
    ) -> Self {
        Self {
            method,
            path,
            query,
            form,
            headers,
            store,
        }
    }

    /// Build a context from the raw parts of a request, parsing the body by content type
    pub fn from_request(
        store: Store,
        method: Method,
        path: String,
        query: HashMap<String, String>,
        headers: HeaderMap,
        body: &[u8],
    ) -> Self {
        let form = if method == Method::POST {
            let content_type = headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            FormData::from_body(content_type, body)
        } else {
            FormData::new()
        };

        Self::new(store, method, path, QueryParams::new(query), form, headers)
    }

    /// Get a header value
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}

/// Query parameters from URL
#[derive(Debug, Clone, Default)]
pub struct QueryParams {
    params: HashMap<String, String>,
}

impl QueryParams {
    pub fn new(params: HashMap<String, String>) -> Self {
        Self { params }
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.params.get(key)
    }

    /// Get a query parameter as a specific type
    pub fn get_as<T: std::str::FromStr>(&self, key: &str) -> Option<T> {
        self.params.get(key)?.parse().ok()
    }

    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.params
    }
}

/// Form data from POST requests
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    raw_json: Option<JsonValue>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from form fields, trimming every value
    pub fn from_fields(fields: HashMap<String, String>) -> Self {
        let fields = fields
            .into_iter()
            .map(|(k, v)| (k, v.trim().to_string()))
            .collect();

        Self {
            fields,
            raw_json: None,
        }
    }

    /// Create from a JSON object; non-string values keep their JSON text
    pub fn from_json(json: JsonValue) -> Self {
        let mut fields = HashMap::new();

        if let JsonValue::Object(map) = &json {
            for (key, value) in map {
                match value.as_str() {
                    Some(s) => fields.insert(key.clone(), s.trim().to_string()),
                    None => fields.insert(key.clone(), value.to_string()),
                };
            }
        }

        Self {
            fields,
            raw_json: Some(json),
        }
    }

    /// Parse an `application/x-www-form-urlencoded` body
    pub fn from_urlencoded(body: &[u8]) -> Self {
        let decode = |s: &str| {
            let s = s.replace('+', " ");
            urlencoding::decode(&s)
                .map(|d| d.into_owned())
                .unwrap_or_else(|_| s.clone())
        };

        let form_str = String::from_utf8_lossy(body);
        let fields = form_str
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((k, v)) => (decode(k), decode(v)),
                None => (decode(pair), String::new()),
            })
            .collect();

        Self::from_fields(fields)
    }

    /// Parse a request body according to its content type; unknown types give an empty form
    pub fn from_body(content_type: &str, body: &[u8]) -> Self {
        if content_type.contains("application/json") {
            serde_json::from_slice::<JsonValue>(body)
                .map(Self::from_json)
                .unwrap_or_default()
        } else if content_type.contains("application/x-www-form-urlencoded") {
            Self::from_urlencoded(body)
        } else {
            Self::new()
        }
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.fields.get(key)
    }

    /// Raw JSON if the body was JSON
    pub fn json(&self) -> Option<&JsonValue> {
        self.raw_json.as_ref()
    }

    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.raw_json.is_none()
    }
}
