use std::sync::mpsc;

use grabber_core::ProgressEvent;

/// Destination for a job's progress events.
///
/// Called from the job thread; implementations should hand the event off
/// (queue, channel, callback) rather than do presentation work inline.
pub trait JobEventSink: Send + Sync {
    fn notify(&self, event: ProgressEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<ProgressEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self { tx }
    }
}

impl JobEventSink for ChannelEventSink {
    fn notify(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}
