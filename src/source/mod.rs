//! Status stream sources and the listener gluing them to the producer.
//!
//! A [`StreamSource`] is chosen once at startup from configuration:
//! [`LiveStreamSource`] subscribes to the external firehose,
//! [`MockStreamSource`] synthesizes statuses on a background worker.
//! Both deliver raw statuses into a [`StatusListener`] on their own
//! delivery task, in arrival order, one send per status.

pub mod live;
pub mod mock;

pub use live::LiveStreamSource;
pub use mock::MockStreamSource;

use crate::config::Config;
use crate::event::{RawStatus, WireEvent};
use crate::kafka::EventSink;
use std::sync::Arc;
use tracing::info;

/// Single-method capability implemented by whatever consumes a stream
/// source's raw statuses.
pub trait StatusListener: Send + Sync + 'static {
    fn on_status(&self, status: RawStatus);
}

/// Glue between a stream source and the produce path: transform the
/// raw status and dispatch exactly one send, keyed by the author id.
/// No buffering, no batching.
pub struct KafkaStatusListener<S: EventSink> {
    topic: String,
    sink: Arc<S>,
}

impl<S: EventSink> KafkaStatusListener<S> {
    pub fn new(topic: String, sink: Arc<S>) -> Self {
        Self { topic, sink }
    }
}

impl<S: EventSink + 'static> StatusListener for KafkaStatusListener<S> {
    fn on_status(&self, status: RawStatus) {
        info!(status_id = status.id, text = %status.text, "Received status");

        let event = WireEvent::from(&status);
        // Fire and forget: the completion task logs the outcome.
        let _ = self.sink.send(&self.topic, event.user_id, event);
    }
}

/// Configuration-selected stream source variant.
pub enum StreamSource {
    Live(LiveStreamSource),
    Mock(MockStreamSource),
}

impl StreamSource {
    pub fn from_config(config: &Config, listener: Arc<dyn StatusListener>) -> Self {
        if config.stream.enable_mock_stream {
            info!("Mock stream enabled, synthesizing statuses");
            StreamSource::Mock(MockStreamSource::new(&config.stream, listener))
        } else {
            StreamSource::Live(LiveStreamSource::new(
                &config.stream,
                config.retry.clone(),
                listener,
            ))
        }
    }

    pub fn start(&mut self) {
        match self {
            StreamSource::Live(source) => source.start(),
            StreamSource::Mock(source) => source.start(),
        }
    }

    pub fn stop(&mut self) {
        match self {
            StreamSource::Live(source) => source.stop(),
            StreamSource::Mock(source) => source.stop(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kafka::ProduceOutcome;
    use chrono::Utc;
    use std::sync::Mutex;
    use tokio::task::JoinHandle;

    #[derive(Default)]
    struct RecordingSink {
        calls: Mutex<Vec<(String, i64, WireEvent)>>,
    }

    impl EventSink for RecordingSink {
        fn send(&self, topic: &str, key: i64, event: WireEvent) -> JoinHandle<ProduceOutcome> {
            self.calls
                .lock()
                .unwrap()
                .push((topic.to_string(), key, event));
            tokio::spawn(std::future::ready(ProduceOutcome::delivered(
                topic.to_string(),
                0,
                0,
            )))
        }
    }

    #[tokio::test]
    async fn listener_dispatches_one_send_keyed_by_author_id() {
        let sink = Arc::new(RecordingSink::default());
        let listener = KafkaStatusListener::new("status-events".to_string(), Arc::clone(&sink));

        let status = RawStatus::new(10, 77, "learning rust today".to_string(), Utc::now());
        listener.on_status(status);

        let calls = sink.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);

        let (topic, key, event) = &calls[0];
        assert_eq!(topic, "status-events");
        assert_eq!(*key, 77);
        assert_eq!(event.user_id, 77);
        assert_eq!(event.id, 10);
        assert_eq!(event.text, "learning rust today");
    }

    #[tokio::test]
    async fn listener_sends_once_per_status() {
        let sink = Arc::new(RecordingSink::default());
        let listener = KafkaStatusListener::new("status-events".to_string(), Arc::clone(&sink));

        for id in 0..3 {
            listener.on_status(RawStatus::new(id, 1, format!("status {id}"), Utc::now()));
        }

        assert_eq!(sink.calls.lock().unwrap().len(), 3);
    }
}
