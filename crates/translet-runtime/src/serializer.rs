//! Serialization sink interface and the output settings carried by a translet.
//!
//! Escaping and formatting are the serializer's business; the runtime only drives the
//! event stream and forwards the `xsl:output` settings.
use std::io::Write;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputMethod {
    #[default]
    Xml,
    Html,
    Text,
    /// No `xsl:output method` given; the serializer decides.
    Unknown,
}

impl OutputMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "xml" => Some(OutputMethod::Xml),
            "html" => Some(OutputMethod::Html),
            "text" => Some(OutputMethod::Text),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputMethod::Xml => "xml",
            OutputMethod::Html => "html",
            OutputMethod::Text => "text",
            OutputMethod::Unknown => "unknown",
        }
    }
}

/// Event sink for the result tree.
pub trait SerializationHandler: Send {
    fn start_document(&mut self) -> Result<(), Error>;
    fn end_document(&mut self) -> Result<(), Error>;
    /// `ns_uri` and `local` are absent for names built without namespace information.
    fn start_element(&mut self, ns_uri: Option<&str>, local: Option<&str>, qname: &str) -> Result<(), Error>;
    fn end_element(&mut self, qname: &str) -> Result<(), Error>;
    /// Declare a namespace on the element most recently started.
    fn namespace_after_start_element(&mut self, prefix: &str, uri: &str) -> Result<(), Error>;
    fn add_attribute(&mut self, qname: &str, value: &str) -> Result<(), Error>;
    fn characters(&mut self, text: &str) -> Result<(), Error>;
    fn comment(&mut self, text: &str) -> Result<(), Error>;
    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), Error>;

    fn set_output_method(&mut self, _method: OutputMethod) {}
    fn set_encoding(&mut self, _encoding: &str) {}
    fn set_version(&mut self, _version: &str) {}
    fn set_indent(&mut self, _indent: bool) {}
    fn set_indent_amount(&mut self, _amount: usize) {}
    fn set_doctype(&mut self, _system: Option<&str>, _public: Option<&str>) {}
    fn set_standalone(&mut self, _standalone: &str) {}
    fn set_omit_xml_declaration(&mut self, _omit: bool) {}
    fn set_media_type(&mut self, _media_type: &str) {}
    fn set_cdata_section_elements(&mut self, _elements: &[String]) {}

    fn flush(&mut self) -> Result<(), Error> {
        Ok(())
    }

    /// Flush and release the underlying stream. Called once.
    fn close(&mut self) -> Result<(), Error> {
        self.flush()
    }
}

/// Creates serializers over a byte stream (used for secondary outputs).
pub trait HandlerFactory: Send + Sync {
    fn create(
        &self,
        writer: Box<dyn Write + Send>,
        settings: &OutputSettings,
    ) -> Result<Box<dyn SerializationHandler>, Error>;
}

/// Settings from `xsl:output`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSettings {
    pub method: Option<OutputMethod>,
    pub encoding: String,
    pub version: Option<String>,
    pub indent: bool,
    pub indent_amount: Option<usize>,
    pub doctype_system: Option<String>,
    pub doctype_public: Option<String>,
    pub standalone: Option<String>,
    pub omit_xml_declaration: bool,
    pub media_type: Option<String>,
    pub cdata_section_elements: Vec<String>,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            method: None,
            encoding: "UTF-8".to_string(),
            version: None,
            indent: false,
            indent_amount: None,
            doctype_system: None,
            doctype_public: None,
            standalone: None,
            omit_xml_declaration: false,
            media_type: None,
            cdata_section_elements: Vec::new(),
        }
    }
}

impl OutputSettings {
    pub fn with_method(mut self, method: OutputMethod) -> Self {
        self.method = Some(method);
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_indent_amount(mut self, amount: usize) -> Self {
        self.indent_amount = Some(amount);
        self
    }

    pub fn with_doctype(mut self, system: Option<String>, public: Option<String>) -> Self {
        self.doctype_system = system;
        self.doctype_public = public;
        self
    }

    pub fn with_standalone(mut self, standalone: impl Into<String>) -> Self {
        self.standalone = Some(standalone.into());
        self
    }

    pub fn with_omit_xml_declaration(mut self, omit: bool) -> Self {
        self.omit_xml_declaration = omit;
        self
    }

    pub fn with_media_type(mut self, media_type: impl Into<String>) -> Self {
        self.media_type = Some(media_type.into());
        self
    }

    pub fn with_cdata_section_elements<I, S>(mut self, elements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cdata_section_elements = elements.into_iter().map(Into::into).collect();
        self
    }

    fn has_doctype(&self) -> bool {
        self.doctype_system.is_some() || self.doctype_public.is_some()
    }

    /// Push the settings relevant to the output method onto `handler`.
    ///
    /// HTML output only receives indentation, doctype and media type; XML output gets
    /// everything except the media type; without a method every setting is forwarded.
    pub fn transfer_to(&self, handler: &mut dyn SerializationHandler) {
        let method = self.method.unwrap_or(OutputMethod::Unknown);
        let xml_like = matches!(method, OutputMethod::Xml | OutputMethod::Unknown);
        let html_like = matches!(method, OutputMethod::Html | OutputMethod::Unknown);
        if xml_like {
            if let Some(standalone) = &self.standalone {
                handler.set_standalone(standalone);
            }
            if self.omit_xml_declaration {
                handler.set_omit_xml_declaration(true);
            }
            if !self.cdata_section_elements.is_empty() {
                handler.set_cdata_section_elements(&self.cdata_section_elements);
            }
            if let Some(version) = &self.version {
                handler.set_version(version);
            }
        }
        handler.set_indent(self.indent);
        if let Some(amount) = self.indent_amount {
            handler.set_indent_amount(amount);
        }
        if self.has_doctype() {
            handler.set_doctype(self.doctype_system.as_deref(), self.doctype_public.as_deref());
        }
        if html_like && let Some(media_type) = &self.media_type {
            handler.set_media_type(media_type);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingHandler;

    fn full() -> OutputSettings {
        OutputSettings::default()
            .with_standalone("yes")
            .with_omit_xml_declaration(true)
            .with_cdata_section_elements(["script"])
            .with_version("1.0")
            .with_indent(true)
            .with_indent_amount(2)
            .with_doctype(Some("about:legacy-compat".into()), None)
            .with_media_type("text/html")
    }

    #[test]
    fn html_receives_only_html_settings() {
        let mut h = RecordingHandler::default();
        full().with_method(OutputMethod::Html).transfer_to(&mut h);
        assert!(h.settings.iter().any(|s| s == "media-type=text/html"));
        assert!(h.settings.iter().any(|s| s == "indent=true"));
        assert!(!h.settings.iter().any(|s| s.starts_with("standalone")));
        assert!(!h.settings.iter().any(|s| s.starts_with("cdata")));
    }

    #[test]
    fn xml_skips_media_type() {
        let mut h = RecordingHandler::default();
        full().with_method(OutputMethod::Xml).transfer_to(&mut h);
        assert!(h.settings.iter().any(|s| s == "standalone=yes"));
        assert!(h.settings.iter().any(|s| s == "cdata=script"));
        assert!(!h.settings.iter().any(|s| s.starts_with("media-type")));
    }

    #[test]
    fn unknown_method_forwards_everything() {
        let mut h = RecordingHandler::default();
        full().transfer_to(&mut h);
        for key in ["standalone", "omit-xml-declaration", "cdata", "version", "indent", "doctype", "media-type"] {
            assert!(h.settings.iter().any(|s| s.starts_with(key)), "missing {key}");
        }
    }

    #[test]
    fn parse_method_names() {
        assert_eq!(OutputMethod::parse("html"), Some(OutputMethod::Html));
        assert_eq!(OutputMethod::parse("xhtml"), None);
    }
}
