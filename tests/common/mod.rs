use firehose_capture::config::{Config, KafkaConfig, StreamConfig};
use firehose_capture::retry::RetryPolicy;
use std::env;

/// Get test configuration from environment variables
pub fn get_test_config() -> Config {
    // Use TEST_ prefix for test environment variables
    let topic = format!("test_statuses_{}", std::process::id());

    let kafka = KafkaConfig {
        brokers: env::var("TEST_KAFKA_BROKERS")
            .unwrap_or_else(|_| "localhost:9092".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect(),
        topic_name: topic.clone(),
        topic_names_to_create: vec![topic],
        num_partitions: 1,
        replication_factor: 1,
        schema_registry_url: env::var("TEST_SCHEMA_REGISTRY_URL")
            .unwrap_or_else(|_| "http://localhost:8081".to_string()),
        registry_timeout_secs: 5,
        compression: "none".to_string(), // No compression for tests
        acks: "all".to_string(),
        linger_ms: 0,      // Immediate sending for tests
        batch_size: 1,     // Small batches for tests
        buffer_memory: 1_048_576, // 1MB for tests
    };

    let retry = RetryPolicy {
        initial_interval_ms: 500,
        max_interval_ms: 5000,
        multiplier: 2.0,
        max_attempts: 5,
        sleep_time_ms: 500,
    };

    let stream = StreamConfig {
        keywords: vec!["rust".to_string()],
        enable_mock_stream: true,
        firehose_url: "http://localhost:9999/statuses/filter".to_string(),
        mock_min_status_length: 5,
        mock_max_status_length: 5,
        mock_sleep_ms: 100,
    };

    Config {
        kafka,
        retry,
        stream,
    }
}
