//! Runtime faults raised while executing a translet.
//!
//! Every fault carries a typed [`ErrorCode`]. The code selects a message template
//! (with positional `{0}`, `{1}` placeholders) so hosts can swap in localized text
//! through [`ErrorCode::template`] without touching the call sites.
use core::fmt;
use std::sync::Arc;

/// Broad classification of runtime faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FaultClass {
    /// An operand of an unsupported kind reached a value conversion.
    Coercion,
    /// Malformed numeric input. Never raised by the value algebra itself (it yields NaN),
    /// kept for hosts that want to report strict conversions.
    Numeric,
    /// Output stream or document retrieval failure.
    Resource,
    /// Compiled logic needs a newer runtime.
    Version,
    /// Unknown function, namespace prefix, document or malformed name.
    Unresolved,
    /// Internal invariant violation or explicit termination.
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum ErrorCode {
    RUN_TIME_INTERNAL_ERR,
    RUN_TIME_COPY_ERR,
    DATA_CONVERSION_ERR,
    INVALID_ARGUMENT_ERR,
    EXTERNAL_FUNC_ERR,
    NAMESPACE_PREFIX_ERR,
    INVALID_QNAME_ERR,
    INVALID_NCNAME_ERR,
    STRAY_ATTRIBUTE_ERR,
    UNKNOWN_TRANSLET_VERSION_ERR,
    DOCUMENT_RESOLVE_ERR,
    CANT_RESOLVE_RELATIVE_URI_ERR,
    OUTPUT_ERR,
    TERMINATE,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::RUN_TIME_INTERNAL_ERR => "RUN_TIME_INTERNAL_ERR",
            ErrorCode::RUN_TIME_COPY_ERR => "RUN_TIME_COPY_ERR",
            ErrorCode::DATA_CONVERSION_ERR => "DATA_CONVERSION_ERR",
            ErrorCode::INVALID_ARGUMENT_ERR => "INVALID_ARGUMENT_ERR",
            ErrorCode::EXTERNAL_FUNC_ERR => "EXTERNAL_FUNC_ERR",
            ErrorCode::NAMESPACE_PREFIX_ERR => "NAMESPACE_PREFIX_ERR",
            ErrorCode::INVALID_QNAME_ERR => "INVALID_QNAME_ERR",
            ErrorCode::INVALID_NCNAME_ERR => "INVALID_NCNAME_ERR",
            ErrorCode::STRAY_ATTRIBUTE_ERR => "STRAY_ATTRIBUTE_ERR",
            ErrorCode::UNKNOWN_TRANSLET_VERSION_ERR => "UNKNOWN_TRANSLET_VERSION_ERR",
            ErrorCode::DOCUMENT_RESOLVE_ERR => "DOCUMENT_RESOLVE_ERR",
            ErrorCode::CANT_RESOLVE_RELATIVE_URI_ERR => "CANT_RESOLVE_RELATIVE_URI_ERR",
            ErrorCode::OUTPUT_ERR => "OUTPUT_ERR",
            ErrorCode::TERMINATE => "TERMINATE",
        }
    }

    pub fn class(&self) -> FaultClass {
        match self {
            ErrorCode::DATA_CONVERSION_ERR | ErrorCode::INVALID_ARGUMENT_ERR => FaultClass::Coercion,
            ErrorCode::OUTPUT_ERR | ErrorCode::DOCUMENT_RESOLVE_ERR => FaultClass::Resource,
            ErrorCode::UNKNOWN_TRANSLET_VERSION_ERR => FaultClass::Version,
            ErrorCode::EXTERNAL_FUNC_ERR
            | ErrorCode::NAMESPACE_PREFIX_ERR
            | ErrorCode::INVALID_QNAME_ERR
            | ErrorCode::INVALID_NCNAME_ERR
            | ErrorCode::CANT_RESOLVE_RELATIVE_URI_ERR => FaultClass::Unresolved,
            ErrorCode::RUN_TIME_INTERNAL_ERR
            | ErrorCode::RUN_TIME_COPY_ERR
            | ErrorCode::STRAY_ATTRIBUTE_ERR
            | ErrorCode::TERMINATE => FaultClass::Internal,
        }
    }

    /// Default (English) message template. Placeholders are `{0}`, `{1}`, ...
    pub fn template(&self) -> &'static str {
        match self {
            ErrorCode::RUN_TIME_INTERNAL_ERR => "Run-time internal error in '{0}'",
            ErrorCode::RUN_TIME_COPY_ERR => "Run-time error when executing <xsl:copy>.",
            ErrorCode::DATA_CONVERSION_ERR => "Invalid conversion from '{0}' to '{1}'.",
            ErrorCode::INVALID_ARGUMENT_ERR => "Argument type '{0}' not valid in call to '{1}'",
            ErrorCode::EXTERNAL_FUNC_ERR => "External function '{0}' not supported by the translet runtime.",
            ErrorCode::NAMESPACE_PREFIX_ERR => "Namespace for prefix '{0}' has not been declared.",
            ErrorCode::INVALID_QNAME_ERR => "An attribute whose value must be a QName had the value '{0}'",
            ErrorCode::INVALID_NCNAME_ERR => "An attribute whose value must be an NCName had the value '{0}'",
            ErrorCode::STRAY_ATTRIBUTE_ERR => "Attribute '{0}' outside of element.",
            ErrorCode::UNKNOWN_TRANSLET_VERSION_ERR => {
                "The specified translet, '{0}', was created using a version of the compiler more recent than the runtime in use. Recompile the stylesheet or use a more recent runtime."
            }
            ErrorCode::DOCUMENT_RESOLVE_ERR => "Could not load document '{0}'.",
            ErrorCode::CANT_RESOLVE_RELATIVE_URI_ERR => "Could not resolve the URI reference '{0}'.",
            ErrorCode::OUTPUT_ERR => "Could not open or write output '{0}'.",
            ErrorCode::TERMINATE => "Termination forced by an xsl:message instruction: {0}",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Substitute `{0}`, `{1}`, ... in `template` with `args`. Unknown indices are kept verbatim.
pub fn render_template(template: &str, args: &[&str]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let idx = &after[..close];
                match idx.parse::<usize>().ok().and_then(|i| args.get(i)) {
                    Some(arg) => out.push_str(arg),
                    None => {
                        out.push('{');
                        out.push_str(idx);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[derive(Debug, Clone, thiserror::Error)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    /// Positional arguments the message was rendered from (offending names/values).
    pub args: Vec<String>,
    #[source]
    pub source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Build an error whose message is the code's template rendered with `args`.
    pub fn from_code<I, S>(code: ErrorCode, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let message = render_template(code.template(), &refs);
        Self { code, message, args, source: None }
    }

    /// Build an error with a free-form message.
    pub fn with_message(code: ErrorCode, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), args: Vec::new(), source: None }
    }

    pub fn internal(location: &str) -> Self {
        Self::from_code(ErrorCode::RUN_TIME_INTERNAL_ERR, [location])
    }

    pub fn class(&self) -> FaultClass {
        self.code.class()
    }

    /// Re-render the message through a host supplied template (e.g. a localized catalog entry).
    pub fn localized(&self, template: &str) -> String {
        let refs: Vec<&str> = self.args.iter().map(String::as_str).collect();
        render_template(template, &refs)
    }

    /// Compose an error with a source cause.
    pub fn with_source(mut self, source: impl Into<Option<Arc<dyn std::error::Error + Send + Sync>>>) -> Self {
        self.source = source.into();
        self
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::with_message(ErrorCode::OUTPUT_ERR, e.to_string())
            .with_source(Some(Arc::new(e) as Arc<dyn std::error::Error + Send + Sync>))
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::with_message(ErrorCode::CANT_RESOLVE_RELATIVE_URI_ERR, e.to_string())
            .with_source(Some(Arc::new(e) as Arc<dyn std::error::Error + Send + Sync>))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {} ({})", self.message, self.code)
    }
}
