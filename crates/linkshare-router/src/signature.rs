/// Handler signature descriptors and route compatibility checks
///
/// A handler declares which arguments it takes; a route supplies one text
/// value per parameter segment. [`validate`] decides whether the two fit.

use thiserror::Error;

/// One declared handler argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerArg {
    pub name: String,
    /// Whether the handler can run without this argument being supplied
    pub has_default: bool,
    /// Declared type as written in source, if the handler declares one
    pub declared_type: Option<String>,
}

impl HandlerArg {
    pub fn new(name: impl Into<String>, has_default: bool, declared_type: Option<&str>) -> Self {
        Self {
            name: name.into(),
            has_default,
            declared_type: declared_type.map(str::to_string),
        }
    }

    /// Untyped argument without a default
    pub fn required(name: impl Into<String>) -> Self {
        Self::new(name, false, None)
    }

    /// Untyped argument with a default
    pub fn optional(name: impl Into<String>) -> Self {
        Self::new(name, true, None)
    }

    /// Same argument with a declared type
    pub fn typed(mut self, declared_type: impl Into<String>) -> Self {
        self.declared_type = Some(declared_type.into());
        self
    }

    fn accepts_text(&self) -> bool {
        self.declared_type.as_deref().map_or(true, is_text_type)
    }
}

/// Declared argument list of a handler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerSignature {
    pub args: Vec<HandlerArg>,
}

impl HandlerSignature {
    pub fn new(args: Vec<HandlerArg>) -> Self {
        Self { args }
    }

    /// Signature of a handler taking no route arguments
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn arg(&self, name: &str) -> Option<&HandlerArg> {
        self.args.iter().find(|a| a.name == name)
    }
}

/// Why a handler cannot serve a route
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
    #[error("handler does not accept route parameter `{name}`")]
    UnacceptedParameter { name: String },

    #[error("handler requires argument `{name}` not supplied by route")]
    UnsuppliedArgument { name: String },

    #[error("argument `{name}` declared as `{declared}`, must accept text")]
    IncompatibleType { name: String, declared: String },
}

impl SignatureError {
    /// Name of the offending parameter or argument
    pub fn name(&self) -> &str {
        match self {
            Self::UnacceptedParameter { name }
            | Self::UnsuppliedArgument { name }
            | Self::IncompatibleType { name, .. } => name,
        }
    }
}

/// Whether a declared type name is a plain text type
///
/// Whitespace is ignored, so `& 'static str` and `&'static str` are the same.
pub fn is_text_type(declared: &str) -> bool {
    let compact: String = declared.chars().filter(|c| !c.is_whitespace()).collect();
    let unqualified = compact
        .strip_prefix("::")
        .unwrap_or(&compact)
        .trim_start_matches("std::")
        .trim_start_matches("alloc::");

    match unqualified {
        "String" | "string::String" | "str" | "&str" | "Box<str>" | "boxed::Box<str>" => true,
        other => {
            // &'a str, Cow<'a, str>, borrow::Cow<str>
            let other = other.trim_start_matches("borrow::");
            (other.starts_with("&'") && other.ends_with("str") && !other.contains('<'))
                || (other.starts_with("Cow<") && other.ends_with("str>"))
        }
    }
}

/// Check that `signature` can serve a route supplying `params`
///
/// Checks run in a fixed order and the first violation is returned:
/// 1. every route parameter is an accepted argument
/// 2. every argument without a default is a route parameter
/// 3. every argument bound to a route parameter accepts text
pub fn validate(signature: &HandlerSignature, params: &[String]) -> Result<(), SignatureError> {
    if let Some(name) = params.iter().find(|p| signature.arg(p).is_none()) {
        return Err(SignatureError::UnacceptedParameter { name: name.clone() });
    }

    if let Some(arg) = signature
        .args
        .iter()
        .find(|a| !a.has_default && !params.contains(&a.name))
    {
        return Err(SignatureError::UnsuppliedArgument {
            name: arg.name.clone(),
        });
    }

    if let Some(arg) = params
        .iter()
        .filter_map(|p| signature.arg(p))
        .find(|a| !a.accepts_text())
    {
        return Err(SignatureError::IncompatibleType {
            name: arg.name.clone(),
            declared: arg.declared_type.clone().unwrap_or_default(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn params(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_matching_untyped_signature_passes() {
        let sig = HandlerSignature::new(vec![HandlerArg::required("share_id")]);
        assert_eq!(validate(&sig, &params(&["share_id"])), Ok(()));
    }

    #[test]
    fn test_empty_signature_and_no_params_pass() {
        assert_eq!(validate(&HandlerSignature::empty(), &[]), Ok(()));
    }

    #[test]
    fn test_missing_parameter_is_reported_first() {
        // Also has an unsupplied required arg and a bad type; the first check wins.
        let sig = HandlerSignature::new(vec![
            HandlerArg::required("other"),
            HandlerArg::required("id").typed("i64"),
        ]);
        let err = validate(&sig, &params(&["id", "share_id"])).unwrap_err();
        assert_eq!(
            err,
            SignatureError::UnacceptedParameter {
                name: "share_id".into()
            }
        );
        assert_eq!(
            err.to_string(),
            "handler does not accept route parameter `share_id`"
        );
    }

    #[test]
    fn test_unsupplied_required_argument() {
        let sig = HandlerSignature::new(vec![
            HandlerArg::required("share_id"),
            HandlerArg::required("token"),
        ]);
        let err = validate(&sig, &params(&["share_id"])).unwrap_err();
        assert_eq!(
            err.to_string(),
            "handler requires argument `token` not supplied by route"
        );
    }

    #[test]
    fn test_defaulted_extra_argument_passes() {
        let sig = HandlerSignature::new(vec![
            HandlerArg::required("share_id").typed("String"),
            HandlerArg::optional("format").typed("u32"),
        ]);
        assert_eq!(validate(&sig, &params(&["share_id"])), Ok(()));
    }

    #[test]
    fn test_incompatible_declared_type() {
        let sig = HandlerSignature::new(vec![HandlerArg::required("share_id").typed("i64")]);
        let err = validate(&sig, &params(&["share_id"])).unwrap_err();
        assert_eq!(err.name(), "share_id");
        assert_eq!(
            err.to_string(),
            "argument `share_id` declared as `i64`, must accept text"
        );
    }

    #[test]
    fn test_inputs_are_untouched() {
        let sig = HandlerSignature::new(vec![HandlerArg::required("a").typed("bool")]);
        let route_params = params(&["a"]);
        let before = (sig.clone(), route_params.clone());
        let _ = validate(&sig, &route_params);
        assert_eq!((sig, route_params), before);
    }

    #[rstest]
    #[case("String", true)]
    #[case("std::string::String", true)]
    #[case("::std::string::String", true)]
    #[case("& str", true)]
    #[case("&'static str", true)]
    #[case("& 'a str", true)]
    #[case("Box<str>", true)]
    #[case("Cow<'_, str>", true)]
    #[case("std::borrow::Cow<'static, str>", true)]
    #[case("i64", false)]
    #[case("Uuid", false)]
    #[case("Vec<String>", false)]
    #[case("&[u8]", false)]
    #[case("Option<String>", false)]
    fn test_text_type_detection(#[case] declared: &str, #[case] expected: bool) {
        assert_eq!(is_text_type(declared), expected);
    }
}
