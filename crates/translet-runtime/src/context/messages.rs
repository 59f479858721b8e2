//! Destinations for `xsl:message` output.
use std::sync::{Arc, Mutex};

use tracing::info;

pub trait MessageHandler: Send + Sync {
    fn display(&self, message: &str);
}

/// Default handler: messages become `info` events on the `translet::message` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMessageHandler;

impl MessageHandler for TracingMessageHandler {
    fn display(&self, message: &str) {
        info!(target: "translet::message", message);
    }
}

/// Collects messages in memory; clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct CollectingMessageHandler {
    messages: Arc<Mutex<Vec<String>>>,
}

impl CollectingMessageHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl MessageHandler for CollectingMessageHandler {
    fn display(&self, message: &str) {
        if let Ok(mut m) = self.messages.lock() {
            m.push(message.to_string());
        }
    }
}
