//! Non-blocking produce path to the broker.
//!
//! [`EventProducer::send`] enqueues a record and returns immediately;
//! the broker write completes on rdkafka's own I/O threads and a
//! spawned completion task logs the result. A failed send is logged
//! and dropped on purpose: it is never retried and never surfaced to
//! the stream source, so broker slowness cannot backpressure the
//! firehose. Do not turn this into a retry loop without revisiting
//! that contract.

use crate::config::KafkaConfig;
use crate::event::WireEvent;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::ClientConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// The result of one send, observable through logs and (in tests)
/// through the handle returned by [`EventSink::send`].
///
/// Exactly one of `partition`+`offset` or `error` is populated; the
/// constructors are the only way to build one.
#[derive(Debug, Clone)]
pub struct ProduceOutcome {
    topic: String,
    partition: Option<i32>,
    offset: Option<i64>,
    sent_at: DateTime<Utc>,
    error: Option<String>,
}

impl ProduceOutcome {
    pub fn delivered(topic: String, partition: i32, offset: i64) -> Self {
        Self {
            topic,
            partition: Some(partition),
            offset: Some(offset),
            sent_at: Utc::now(),
            error: None,
        }
    }

    pub fn failed(topic: String, error: String) -> Self {
        Self {
            topic,
            partition: None,
            offset: None,
            sent_at: Utc::now(),
            error: Some(error),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn partition(&self) -> Option<i32> {
        self.partition
    }

    pub fn offset(&self) -> Option<i64> {
        self.offset
    }

    pub fn sent_at(&self) -> DateTime<Utc> {
        self.sent_at
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_delivered(&self) -> bool {
        self.error.is_none()
    }
}

/// Seam between the status listener and the produce path.
pub trait EventSink: Send + Sync {
    /// Hands one event to the broker without blocking the caller.
    fn send(&self, topic: &str, key: i64, event: WireEvent) -> JoinHandle<ProduceOutcome>;
}

pub struct EventProducer {
    producer: FutureProducer,
    closed: AtomicBool,
}

impl EventProducer {
    pub fn new(brokers: &[String], config: &KafkaConfig) -> Result<Self> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers.join(","))
            .set("compression.type", &config.compression)
            .set("acks", &config.acks)
            .set("linger.ms", config.linger_ms.to_string())
            .set("batch.size", config.batch_size.to_string())
            .set("buffer.memory", config.buffer_memory.to_string())
            .create()
            .map_err(Error::Kafka)?;

        Ok(Self {
            producer,
            closed: AtomicBool::new(false),
        })
    }

    /// Flushes and releases the underlying client exactly once; safe
    /// to call multiple times. Must run on process termination so
    /// queued records reach the broker.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("Closing kafka producer");
        if let Err(e) = self.producer.flush(Duration::from_secs(10)) {
            error!(error = %e, "Kafka producer flush failed during shutdown");
        }
    }
}

impl EventSink for EventProducer {
    fn send(&self, topic: &str, key: i64, event: WireEvent) -> JoinHandle<ProduceOutcome> {
        let topic_owned = topic.to_string();

        let payload = match serde_json::to_vec(&event) {
            Ok(payload) => payload,
            Err(e) => {
                let outcome = ProduceOutcome::failed(topic_owned, e.to_string());
                log_outcome(key, &outcome);
                return tokio::spawn(std::future::ready(outcome));
            }
        };

        let key_bytes = key.to_string();
        let record = FutureRecord::to(topic).key(&key_bytes).payload(&payload);

        // send_result copies the record into the client queue and
        // returns the delivery future without awaiting broker I/O.
        match self.producer.send_result(record) {
            Ok(delivery) => tokio::spawn(async move {
                let outcome = match delivery.await {
                    Ok(Ok((partition, offset))) => {
                        ProduceOutcome::delivered(topic_owned, partition, offset)
                    }
                    Ok(Err((e, _message))) => ProduceOutcome::failed(topic_owned, e.to_string()),
                    Err(_) => ProduceOutcome::failed(
                        topic_owned,
                        "delivery future canceled before completion".to_string(),
                    ),
                };
                log_outcome(key, &outcome);
                outcome
            }),
            Err((e, _record)) => {
                let outcome = ProduceOutcome::failed(topic_owned, e.to_string());
                log_outcome(key, &outcome);
                tokio::spawn(std::future::ready(outcome))
            }
        }
    }
}

fn log_outcome(key: i64, outcome: &ProduceOutcome) {
    match outcome.error() {
        None => {
            info!(
                topic = %outcome.topic(),
                key,
                partition = outcome.partition().unwrap_or(-1),
                offset = outcome.offset().unwrap_or(-1),
                sent_at = %outcome.sent_at(),
                "Message sent successfully"
            );
        }
        Some(error) => {
            error!(
                topic = %outcome.topic(),
                key,
                error,
                "Failed to send message to kafka"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivered_outcome_has_partition_and_offset_but_no_error() {
        let outcome = ProduceOutcome::delivered("status-events".to_string(), 2, 41);

        assert!(outcome.is_delivered());
        assert_eq!(outcome.partition(), Some(2));
        assert_eq!(outcome.offset(), Some(41));
        assert!(outcome.error().is_none());
    }

    #[test]
    fn failed_outcome_has_error_but_no_partition_or_offset() {
        let outcome =
            ProduceOutcome::failed("status-events".to_string(), "queue full".to_string());

        assert!(!outcome.is_delivered());
        assert_eq!(outcome.partition(), None);
        assert_eq!(outcome.offset(), None);
        assert_eq!(outcome.error(), Some("queue full"));
    }
}
