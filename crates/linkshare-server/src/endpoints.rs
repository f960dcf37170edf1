// File: src/endpoints.rs
// Purpose: Registry of the endpoint files under src/endpoints, generated by build.rs
//
// Each file becomes `endpoints::unit_N`; `registry()` maps its path relative to
// `ENDPOINTS_ROOT` to the `get` / `post` handlers it declares.

include!(concat!(env!("OUT_DIR"), "/endpoint_registry.rs"));
