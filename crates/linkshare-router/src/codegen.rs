/// Build-time endpoint registry generation
///
/// Called from a build script. Walks the endpoints directory, parses every
/// handler file with `syn`, reads the declared arguments of its `get` / `post`
/// functions and writes a Rust module that:
/// - includes each file as its own module (`#[path = ".."] mod unit_N;`)
/// - wraps each handler in the crate's adapter so it can be called with a
///   context value and the matched route arguments
/// - exposes `registry()` returning an [`crate::EndpointRegistry`]
///
/// Handler arguments are read statically: an argument of the context type is
/// injected and not part of the signature, `Option<T>` marks an argument with
/// a default, any other type is recorded as declared.

use std::fs;
use std::path::{Path, PathBuf};

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{FnArg, GenericArgument, Item, ItemFn, Pat, PathArguments, Type, Visibility};

use crate::loader::LoadError;
use crate::method::RECOGNIZED_HANDLER_NAMES;
use crate::signature::{HandlerArg, HandlerSignature};
use crate::tree::{EndpointTree, FsTree};

/// Paths the generated code refers to, as Rust source
#[derive(Debug, Clone)]
pub struct CodegenOptions {
    /// Last path segment identifying the injected context type, e.g. "EndpointContext"
    pub context_type_name: String,
    /// Full path of the context type
    pub context_path: String,
    /// Type of the route arguments bag; must have `take(&mut self, name) -> Result<T, E>`
    pub args_path: String,
    /// Handler type stored in the registry
    pub handler_path: String,
    /// Function turning `Fn(Context, Args) -> Future<Output = Result<R, E>>` into a handler
    pub adapter_path: String,
    /// Error type `E`
    pub error_path: String,
}

/// How a handler argument is supplied at call time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallArg {
    Context,
    ContextRef,
    Route(String),
    /// Borrowed argument; `text` when it borrows `str`
    RouteRef { name: String, text: bool },
}

/// A `get` / `post` function found in an endpoint file
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedHandler {
    pub name: String,
    pub signature: HandlerSignature,
    pub call_args: Vec<CallArg>,
    pub is_async: bool,
}

/// One endpoint file and its handlers
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedUnit {
    /// Path relative to the endpoints root, `/`-separated
    pub relative: String,
    pub absolute: PathBuf,
    pub handlers: Vec<ScannedHandler>,
}

fn parse_error(path: &Path, message: impl Into<String>) -> LoadError {
    LoadError::Parse {
        path: path.to_path_buf(),
        message: message.into(),
    }
}

/// Render a type without the spaces `quote` puts between every token
fn compact_type(ty: &Type) -> String {
    let raw = quote!(#ty).to_string();
    let chars: Vec<char> = raw.chars().collect();
    let is_word = |c: char| c.is_alphanumeric() || c == '_';

    let mut out = String::with_capacity(raw.len());
    for (i, &c) in chars.iter().enumerate() {
        if c != ' ' {
            out.push(c);
            continue;
        }
        let prev = out.chars().last();
        let next = chars[i + 1..].iter().find(|c| **c != ' ').copied();
        if let (Some(p), Some(n)) = (prev, next) {
            if is_word(p) && is_word(n) {
                out.push(' ');
            }
        }
    }
    out
}

/// `Some(T)` when `ty` is `Option<T>`
fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let last = type_path.path.segments.last()?;
    if last.ident != "Option" {
        return None;
    }
    match &last.arguments {
        PathArguments::AngleBracketed(args) if args.args.len() == 1 => match args.args.first() {
            Some(GenericArgument::Type(inner)) => Some(inner),
            _ => None,
        },
        _ => None,
    }
}

/// Whether `ty` (or a reference to it) names the context type
fn is_context_type(ty: &Type, context_type_name: &str) -> bool {
    match ty {
        Type::Reference(r) => is_context_type(&r.elem, context_type_name),
        Type::Path(p) => p
            .path
            .segments
            .last()
            .is_some_and(|s| s.ident == context_type_name),
        _ => false,
    }
}

fn scan_handler(path: &Path, item: &ItemFn, context_type_name: &str) -> Result<ScannedHandler, LoadError> {
    let name = item.sig.ident.to_string();

    if matches!(item.vis, Visibility::Inherited) {
        return Err(parse_error(
            path,
            format!("handler `{}` must be declared `pub`", name),
        ));
    }

    let mut args = Vec::new();
    let mut call_args = Vec::new();

    for input in &item.sig.inputs {
        let FnArg::Typed(pat_type) = input else {
            return Err(parse_error(path, format!("handler `{}` cannot take `self`", name)));
        };

        if is_context_type(&pat_type.ty, context_type_name) {
            call_args.push(match pat_type.ty.as_ref() {
                Type::Reference(_) => CallArg::ContextRef,
                _ => CallArg::Context,
            });
            continue;
        }

        let Pat::Ident(pat_ident) = pat_type.pat.as_ref() else {
            return Err(parse_error(
                path,
                format!("handler `{}` arguments must be plain identifiers", name),
            ));
        };
        let arg_name = pat_ident.ident.to_string();

        let arg = match option_inner(&pat_type.ty) {
            Some(inner) => HandlerArg::new(&arg_name, true, Some(&compact_type(inner))),
            None => HandlerArg::new(&arg_name, false, Some(&compact_type(&pat_type.ty))),
        };
        args.push(arg);
        call_args.push(match pat_type.ty.as_ref() {
            Type::Reference(r) => CallArg::RouteRef {
                name: arg_name,
                text: matches!(r.elem.as_ref(), Type::Path(p) if p.path.is_ident("str")),
            },
            _ => CallArg::Route(arg_name),
        });
    }

    Ok(ScannedHandler {
        name,
        signature: HandlerSignature::new(args),
        call_args,
        is_async: item.sig.asyncness.is_some(),
    })
}

/// Parse Rust source of one endpoint file and extract its handlers
pub fn scan_source(path: &Path, source: &str, context_type_name: &str) -> Result<Vec<ScannedHandler>, LoadError> {
    let file = syn::parse_file(source).map_err(|e| parse_error(path, e.to_string()))?;

    file.items
        .iter()
        .filter_map(|item| match item {
            Item::Fn(f) if RECOGNIZED_HANDLER_NAMES.contains(&f.sig.ident.to_string().as_str()) => Some(f),
            _ => None,
        })
        .map(|f| scan_handler(path, f, context_type_name))
        .collect()
}

/// Read and scan one endpoint file
pub fn scan_file(path: &Path, context_type_name: &str) -> Result<Vec<ScannedHandler>, LoadError> {
    let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    scan_source(path, &source, context_type_name)
}

/// Scan every handler file below `root`
pub fn scan_tree(root: &Path, context_type_name: &str) -> Result<Vec<ScannedUnit>, LoadError> {
    let tree = FsTree::new(root);
    let absolute_root = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());

    tree.handler_files()?
        .into_iter()
        .map(|file| {
            let relative = file
                .strip_prefix(tree.root())
                .unwrap_or(file.as_path())
                .to_string_lossy()
                .replace('\\', "/");
            let handlers = scan_file(&file, context_type_name)?;
            Ok(ScannedUnit {
                absolute: absolute_root.join(&relative),
                relative,
                handlers,
            })
        })
        .collect()
}

fn parse_tokens(what: &str, source: &str) -> Result<TokenStream, LoadError> {
    source
        .parse::<TokenStream>()
        .map_err(|e| parse_error(Path::new(what), e.to_string()))
}

fn render_handler(module: &proc_macro2::Ident, handler: &ScannedHandler, paths: &RenderPaths) -> TokenStream {
    let RenderPaths {
        context,
        args,
        adapter,
        error,
        ..
    } = paths;

    let name = &handler.name;
    let fn_ident = format_ident!("{}", handler.name);

    let arg_specs = handler.signature.args.iter().map(|arg| {
        let arg_name = &arg.name;
        let has_default = arg.has_default;
        let declared = match &arg.declared_type {
            Some(t) => quote!(::core::option::Option::Some(#t)),
            None => quote!(::core::option::Option::None),
        };
        quote!(::linkshare_router::HandlerArg::new(#arg_name, #has_default, #declared))
    });

    let call_values = handler.call_args.iter().map(|arg| match arg {
        CallArg::Context => quote!(__ctx.clone()),
        CallArg::ContextRef => quote!(&__ctx),
        CallArg::Route(arg_name) => quote!(__args.take(#arg_name)?),
        CallArg::RouteRef { name, text: true } => {
            quote!(&__args.take::<::std::string::String>(#name)?)
        }
        CallArg::RouteRef { name, text: false } => quote!(&__args.take(#name)?),
    });

    let call = if handler.is_async {
        quote!(#module::#fn_ident(#(#call_values),*).await)
    } else {
        quote!(#module::#fn_ident(#(#call_values),*))
    };

    quote! {
        ::linkshare_router::HandlerCandidate::new(
            #name,
            ::linkshare_router::HandlerSignature::new(vec![#(#arg_specs),*]),
            #adapter(|__ctx: #context, mut __args: #args| async move {
                let __response = #call;
                ::core::result::Result::Ok::<_, #error>(__response)
            }),
        )
    }
}

struct RenderPaths {
    context: TokenStream,
    args: TokenStream,
    handler: TokenStream,
    adapter: TokenStream,
    error: TokenStream,
}

/// Render the registry module for `units`
pub fn render_registry(root: &Path, units: &[ScannedUnit], options: &CodegenOptions) -> Result<String, LoadError> {
    let paths = RenderPaths {
        context: parse_tokens("context_path", &options.context_path)?,
        args: parse_tokens("args_path", &options.args_path)?,
        handler: parse_tokens("handler_path", &options.handler_path)?,
        adapter: parse_tokens("adapter_path", &options.adapter_path)?,
        error: parse_tokens("error_path", &options.error_path)?,
    };
    let handler_ty = &paths.handler;
    let root_str = root.to_string_lossy().into_owned();

    let modules = units.iter().enumerate().map(|(i, unit)| {
        let module = format_ident!("unit_{}", i);
        let abs = unit.absolute.to_string_lossy().into_owned();
        quote! {
            #[path = #abs]
            mod #module;
        }
    });

    let factories = units.iter().enumerate().map(|(i, unit)| {
        let module = format_ident!("unit_{}", i);
        let factory = format_ident!("unit_{}_handlers", i);
        let candidates = unit.handlers.iter().map(|h| render_handler(&module, h, &paths));
        quote! {
            #[allow(unused_mut, unused_variables)]
            fn #factory() -> ::std::vec::Vec<::linkshare_router::HandlerCandidate<#handler_ty>> {
                vec![#(#candidates),*]
            }
        }
    });

    let registrations = units.iter().enumerate().map(|(i, unit)| {
        let factory = format_ident!("unit_{}_handlers", i);
        let relative = &unit.relative;
        quote!(.unit(#relative, #factory))
    });

    let tokens = quote! {
        /// Directory the endpoint files were compiled from
        pub const ENDPOINTS_ROOT: &str = #root_str;

        #(#modules)*

        #(#factories)*

        /// Every compiled endpoint file with its handler factory
        pub fn registry() -> ::linkshare_router::EndpointRegistry<#handler_ty> {
            ::linkshare_router::EndpointRegistry::new(ENDPOINTS_ROOT)
                #(#registrations)*
        }
    };

    Ok(format!("// @generated by linkshare-router codegen. Do not edit.\n{}\n", tokens))
}

/// Scan `root` and write the registry module to `out_file`
///
/// Returns the scanned files so the build script can emit `rerun-if-changed` lines.
pub fn generate(root: &Path, out_file: &Path, options: &CodegenOptions) -> Result<Vec<PathBuf>, LoadError> {
    let units = scan_tree(root, &options.context_type_name)?;
    let absolute_root = fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    let source = render_registry(&absolute_root, &units, options)?;

    fs::write(out_file, source).map_err(|source| LoadError::Io {
        path: out_file.to_path_buf(),
        source,
    })?;

    Ok(units.into_iter().map(|u| u.absolute).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CTX: &str = "EndpointContext";

    fn scan(source: &str) -> Result<Vec<ScannedHandler>, LoadError> {
        scan_source(Path::new("endpoint.rs"), source, CTX)
    }

    #[test]
    fn test_scans_route_and_context_arguments() {
        let handlers = scan(
            r#"
            use crate::http::EndpointContext;

            pub async fn get(ctx: EndpointContext, share_id: String) -> String {
                share_id
            }

            fn helper() {}
            "#,
        )
        .unwrap();

        assert_eq!(handlers.len(), 1);
        let get = &handlers[0];
        assert_eq!(get.name, "get");
        assert!(get.is_async);
        assert_eq!(
            get.signature,
            HandlerSignature::new(vec![HandlerArg::new("share_id", false, Some("String"))])
        );
        assert_eq!(
            get.call_args,
            vec![CallArg::Context, CallArg::Route("share_id".into())]
        );
    }

    #[test]
    fn test_option_marks_default_and_types_are_compacted() {
        let handlers = scan(
            "pub fn post(name: Option<String>, id: &'static str, n: std::primitive::i64) {}",
        )
        .unwrap();

        let args = &handlers[0].signature.args;
        assert_eq!(args[0], HandlerArg::new("name", true, Some("String")));
        assert_eq!(args[1], HandlerArg::new("id", false, Some("&'static str")));
        assert_eq!(args[2], HandlerArg::new("n", false, Some("std::primitive::i64")));
        assert!(!handlers[0].is_async);
        assert_eq!(
            handlers[0].call_args[1],
            CallArg::RouteRef {
                name: "id".into(),
                text: true
            }
        );
    }

    #[test]
    fn test_file_without_handlers() {
        assert!(scan("pub fn list_all() {}").unwrap().is_empty());
    }

    #[test]
    fn test_private_handler_is_rejected() {
        let err = scan("fn get() {}").unwrap_err();
        assert!(err.to_string().contains("must be declared `pub`"));
    }

    #[test]
    fn test_syntax_error_fails_to_load() {
        let err = scan("pub fn get( {").unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn test_render_registry_mentions_every_unit() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("shares/_share_id")).unwrap();
        fs::write(
            root.join("shares/_share_id/details.rs"),
            "pub async fn get(share_id: String) -> String { share_id }",
        )
        .unwrap();
        fs::write(root.join("shares/list.rs"), "pub fn get() -> u8 { 0 }").unwrap();

        let units = scan_tree(root, CTX).unwrap();
        let relative: Vec<_> = units.iter().map(|u| u.relative.as_str()).collect();
        assert_eq!(relative, vec!["shares/_share_id/details.rs", "shares/list.rs"]);

        let options = CodegenOptions {
            context_type_name: CTX.into(),
            context_path: "crate::http::EndpointContext".into(),
            args_path: "crate::http::RouteArgs".into(),
            handler_path: "crate::http::Handler".into(),
            adapter_path: "crate::http::handler".into(),
            error_path: "crate::http::ApiError".into(),
        };
        let source = render_registry(root, &units, &options).unwrap();

        assert!(source.contains("mod unit_0"));
        assert!(source.contains("mod unit_1"));
        assert!(source.contains("\"shares/_share_id/details.rs\""));
        assert!(source.contains("take"));
        assert!(source.contains("\"share_id\""));
        assert!(syn::parse_file(&source).is_ok());
    }
}
