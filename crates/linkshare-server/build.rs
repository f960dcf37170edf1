// Generates the endpoint registry from src/endpoints.
//
// Every .rs file below src/endpoints becomes a module of the crate and its
// `get` / `post` functions are recorded with their declared arguments. A file
// that does not parse fails the build.

use std::env;
use std::path::PathBuf;

use linkshare_router::codegen::{generate, CodegenOptions};

fn main() {
    let manifest_dir =
        PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo"));
    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));

    let endpoints_root = manifest_dir.join("src").join("endpoints");
    let out_file = out_dir.join("endpoint_registry.rs");

    println!("cargo:rerun-if-changed={}", endpoints_root.display());

    let options = CodegenOptions {
        context_type_name: "EndpointContext".to_string(),
        context_path: "crate::context::EndpointContext".to_string(),
        args_path: "crate::handler::RouteArgs".to_string(),
        handler_path: "crate::handler::Handler".to_string(),
        adapter_path: "crate::handler::handler".to_string(),
        error_path: "crate::error::ApiError".to_string(),
    };

    match generate(&endpoints_root, &out_file, &options) {
        Ok(files) => {
            for file in files {
                println!("cargo:rerun-if-changed={}", file.display());
            }
        }
        Err(e) => panic!("failed to generate endpoint registry: {}", e),
    }
}
