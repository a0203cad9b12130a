use std::sync::mpsc;

use crate::ScrapeEvent;

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ScrapeEvent);
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: ScrapeEvent) {}
}

/// Forwards events to a channel, e.g. for a UI thread or a test.
pub struct ChannelProgressSink {
    tx: mpsc::Sender<ScrapeEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::Sender<ScrapeEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: ScrapeEvent) {
        let _ = self.tx.send(event);
    }
}
