//! Secondary result documents (`xsl:result-document` style redirection).
use std::fs::{self, OpenOptions};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Error, ErrorCode};
use crate::serializer::{HandlerFactory, OutputSettings, SerializationHandler};

/// An open secondary output. The document is ended and the stream closed by
/// [`OutputHandle::close`], or on drop if the caller bails out early.
pub struct OutputHandle {
    path: PathBuf,
    handler: Box<dyn SerializationHandler>,
    closed: bool,
}

impl OutputHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn handler(&mut self) -> &mut dyn SerializationHandler {
        self.handler.as_mut()
    }

    fn finish(&mut self) -> Result<(), Error> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        let ended = self.handler.end_document();
        let closed = self.handler.close();
        ended.and(closed)
    }

    pub fn close(mut self) -> Result<(), Error> {
        debug!(path = %self.path.display(), "close output");
        self.finish()
    }
}

impl Drop for OutputHandle {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            warn!(path = %self.path.display(), error = %e, "failed to close output");
        }
    }
}

fn output_error(path: &Path, e: std::io::Error) -> Error {
    Error::from_code(ErrorCode::OUTPUT_ERR, [path.display().to_string()])
        .with_source(Some(Arc::new(e) as Arc<dyn std::error::Error + Send + Sync>))
}

/// Open `path` for writing (creating parent directories), wrap it in a serializer from
/// `factory` configured with `settings`, and start the document.
pub fn open_output(
    path: &Path,
    append: bool,
    factory: &dyn HandlerFactory,
    settings: &OutputSettings,
) -> Result<OutputHandle, Error> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|e| output_error(path, e))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .map_err(|e| output_error(path, e))?;
    debug!(path = %path.display(), append, "open output");
    let mut handler = factory.create(Box::new(BufWriter::new(file)), settings)?;
    if let Some(method) = settings.method {
        handler.set_output_method(method);
    }
    handler.set_encoding(&settings.encoding);
    settings.transfer_to(handler.as_mut());
    let mut handle = OutputHandle { path: path.to_path_buf(), handler, closed: false };
    handle.handler().start_document()?;
    Ok(handle)
}
