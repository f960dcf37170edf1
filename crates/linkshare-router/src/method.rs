/// Handler name → HTTP verb resolution

use std::fmt;

use tracing::warn;

/// Handler names the loader looks for in endpoint files
pub const RECOGNIZED_HANDLER_NAMES: [&str; 2] = ["get", "post"];

/// HTTP verbs a discovered handler can serve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Verb {
    Get,
    Post,
}

impl Verb {
    /// Upper-case method name, e.g. "GET"
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
        }
    }

    /// Lower-case component used at the end of route ids, e.g. "get"
    pub fn id_component(self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Post => "post",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of resolving a handler name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedMethod {
    pub verb: Verb,
    /// Set when the name was not recognized and GET was assumed
    pub fallback: bool,
}

/// Resolve a handler's conventional name to its verb
///
/// Unknown names resolve to GET with `fallback` set, so an unexpected extra
/// function never blocks an otherwise valid file.
pub fn resolve_method(handler_name: &str) -> ResolvedMethod {
    match handler_name {
        "get" => ResolvedMethod {
            verb: Verb::Get,
            fallback: false,
        },
        "post" => ResolvedMethod {
            verb: Verb::Post,
            fallback: false,
        },
        other => {
            warn!(
                handler = other,
                "No HTTP method defined for endpoint handler name, registering as GET-only"
            );
            ResolvedMethod {
                verb: Verb::Get,
                fallback: true,
            }
        }
    }
}
