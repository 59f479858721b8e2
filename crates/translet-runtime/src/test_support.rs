//! Serializer doubles for tests: every event becomes one line of text.
use std::io::Write;

use crate::error::Error;
use crate::serializer::{HandlerFactory, OutputMethod, OutputSettings, SerializationHandler};

/// Records events in memory and, when backed by a stream, writes them out line by line.
#[derive(Default)]
pub struct RecordingHandler {
    pub events: Vec<String>,
    pub settings: Vec<String>,
    pub closed: bool,
    writer: Option<Box<dyn Write + Send>>,
}

impl RecordingHandler {
    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self { writer: Some(writer), ..Self::default() }
    }

    fn record(&mut self, event: String) -> Result<(), Error> {
        if let Some(w) = self.writer.as_mut() {
            writeln!(w, "{event}")?;
        }
        self.events.push(event);
        Ok(())
    }

    fn setting(&mut self, s: String) {
        self.settings.push(s);
    }
}

impl core::fmt::Debug for RecordingHandler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RecordingHandler")
            .field("events", &self.events)
            .field("settings", &self.settings)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl SerializationHandler for RecordingHandler {
    fn start_document(&mut self) -> Result<(), Error> {
        self.record("start-document".into())
    }

    fn end_document(&mut self) -> Result<(), Error> {
        self.record("end-document".into())
    }

    fn start_element(&mut self, ns_uri: Option<&str>, local: Option<&str>, qname: &str) -> Result<(), Error> {
        self.record(format!("start {qname} {{{}}}{}", ns_uri.unwrap_or_default(), local.unwrap_or_default()))
    }

    fn end_element(&mut self, qname: &str) -> Result<(), Error> {
        self.record(format!("end {qname}"))
    }

    fn namespace_after_start_element(&mut self, prefix: &str, uri: &str) -> Result<(), Error> {
        self.record(format!("xmlns:{prefix}={uri}"))
    }

    fn add_attribute(&mut self, qname: &str, value: &str) -> Result<(), Error> {
        self.record(format!("@{qname}={value}"))
    }

    fn characters(&mut self, text: &str) -> Result<(), Error> {
        self.record(format!("text {text}"))
    }

    fn comment(&mut self, text: &str) -> Result<(), Error> {
        self.record(format!("comment {text}"))
    }

    fn processing_instruction(&mut self, target: &str, data: &str) -> Result<(), Error> {
        self.record(format!("pi {target} {data}"))
    }

    fn set_output_method(&mut self, method: OutputMethod) {
        self.setting(format!("method={}", method.as_str()));
    }

    fn set_encoding(&mut self, encoding: &str) {
        self.setting(format!("encoding={encoding}"));
    }

    fn set_version(&mut self, version: &str) {
        self.setting(format!("version={version}"));
    }

    fn set_indent(&mut self, indent: bool) {
        self.setting(format!("indent={indent}"));
    }

    fn set_indent_amount(&mut self, amount: usize) {
        self.setting(format!("indent-amount={amount}"));
    }

    fn set_doctype(&mut self, system: Option<&str>, public: Option<&str>) {
        self.setting(format!("doctype={}|{}", system.unwrap_or_default(), public.unwrap_or_default()));
    }

    fn set_standalone(&mut self, standalone: &str) {
        self.setting(format!("standalone={standalone}"));
    }

    fn set_omit_xml_declaration(&mut self, omit: bool) {
        self.setting(format!("omit-xml-declaration={omit}"));
    }

    fn set_media_type(&mut self, media_type: &str) {
        self.setting(format!("media-type={media_type}"));
    }

    fn set_cdata_section_elements(&mut self, elements: &[String]) {
        self.setting(format!("cdata={}", elements.join(" ")));
    }

    fn flush(&mut self) -> Result<(), Error> {
        if let Some(w) = self.writer.as_mut() {
            w.flush()?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), Error> {
        self.flush()?;
        self.writer = None;
        self.closed = true;
        Ok(())
    }
}

/// Factory handing out [`RecordingHandler`]s over the given stream.
#[derive(Debug, Default, Clone, Copy)]
pub struct RecordingFactory;

impl HandlerFactory for RecordingFactory {
    fn create(
        &self,
        writer: Box<dyn Write + Send>,
        settings: &OutputSettings,
    ) -> Result<Box<dyn SerializationHandler>, Error> {
        let mut handler = RecordingHandler::with_writer(writer);
        handler.set_encoding(&settings.encoding);
        Ok(Box::new(handler))
    }
}
