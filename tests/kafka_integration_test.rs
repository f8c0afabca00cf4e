//! Integration tests against a live Kafka broker (and schema
//! registry). Provision the services, export TEST_KAFKA_BROKERS /
//! TEST_SCHEMA_REGISTRY_URL if they differ from localhost defaults,
//! then run: cargo test -- --ignored

mod common;

use async_trait::async_trait;
use chrono::Utc;
use firehose_capture::event::{RawStatus, WireEvent};
use firehose_capture::kafka::{EventProducer, EventSink, KafkaAdmin};
use firehose_capture::readiness::{BrokerAdmin, HealthProbe};
use firehose_capture::registry::SchemaRegistryClient;
use firehose_capture::{Result, StartupGate};
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::Message;
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;

struct AlwaysReady;

#[async_trait]
impl HealthProbe for AlwaysReady {
    async fn probe(&self) -> Result<u16> {
        Ok(200)
    }
}

#[tokio::test]
#[ignore] // Requires running Kafka
async fn test_topic_creation_and_confirmation() {
    let config = common::get_test_config();
    let admin = KafkaAdmin::new(&config.kafka.brokers).unwrap();
    let gate = StartupGate::new(admin, AlwaysReady, config.retry.clone());

    gate.ensure_topics(&config.topic_specs()).await.unwrap();

    // A fresh admin client must see the topic in its listing.
    let admin = KafkaAdmin::new(&config.kafka.brokers).unwrap();
    let topics = admin.list_topics().await.unwrap();
    assert!(topics.contains(&config.kafka.topic_name));

    // Re-running against existing topics is not an error.
    gate.ensure_topics(&config.topic_specs()).await.unwrap();
}

#[tokio::test]
#[ignore] // Requires running Kafka
async fn test_produce_and_consume_round_trip() {
    let config = common::get_test_config();
    let admin = KafkaAdmin::new(&config.kafka.brokers).unwrap();
    let gate = StartupGate::new(admin, AlwaysReady, config.retry.clone());
    gate.ensure_topics(&config.topic_specs()).await.unwrap();

    let producer = EventProducer::new(&config.kafka.brokers, &config.kafka).unwrap();

    let status = RawStatus::new(42, 7, "integration rust status".to_string(), Utc::now());
    let event = WireEvent::from(&status);
    let outcome = producer
        .send(&config.kafka.topic_name, event.user_id, event)
        .await
        .unwrap();

    assert!(outcome.is_delivered());
    assert_eq!(outcome.topic(), config.kafka.topic_name);
    assert!(outcome.offset().is_some());

    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", config.kafka.brokers.join(","))
        .set("group.id", format!("test_group_{}", std::process::id()))
        .set("auto.offset.reset", "earliest")
        .set("enable.auto.commit", "false")
        .create()
        .unwrap();
    consumer.subscribe(&[config.kafka.topic_name.as_str()]).unwrap();

    let message = timeout(Duration::from_secs(10), consumer.recv())
        .await
        .expect("timed out waiting for message")
        .unwrap();

    assert_eq!(message.key(), Some("7".as_bytes()));

    let json: Value = serde_json::from_slice(message.payload().unwrap()).unwrap();
    assert_eq!(json["id"], 42);
    assert_eq!(json["user_id"], 7);
    assert_eq!(json["text"], "integration rust status");
    assert!(json["created_at_ms"].is_number());

    producer.close();
    producer.close(); // close is safe to call twice
}

#[tokio::test]
#[ignore] // Requires running schema registry
async fn test_schema_registry_health_check() {
    let config = common::get_test_config();
    let admin = KafkaAdmin::new(&config.kafka.brokers).unwrap();
    let registry = SchemaRegistryClient::new(
        config.kafka.schema_registry_url.clone(),
        Duration::from_secs(config.kafka.registry_timeout_secs),
    )
    .unwrap();
    let gate = StartupGate::new(admin, registry, config.retry.clone());

    gate.await_schema_registry().await.unwrap();
}
