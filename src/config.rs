use crate::readiness::TopicSpec;
use crate::retry::RetryPolicy;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub kafka: KafkaConfig,
    pub retry: RetryPolicy,
    pub stream: StreamConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KafkaConfig {
    pub brokers: Vec<String>,
    pub topic_name: String,
    pub topic_names_to_create: Vec<String>,
    #[serde(default = "default_num_partitions")]
    pub num_partitions: i32,
    #[serde(default = "default_replication_factor")]
    pub replication_factor: i32,
    pub schema_registry_url: String,
    #[serde(default = "default_registry_timeout")]
    pub registry_timeout_secs: u64,
    #[serde(default = "default_compression")]
    pub compression: String,
    #[serde(default = "default_acks")]
    pub acks: String,
    #[serde(default = "default_linger_ms")]
    pub linger_ms: u32,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_buffer_memory")]
    pub buffer_memory: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StreamConfig {
    pub keywords: Vec<String>,
    #[serde(default)]
    pub enable_mock_stream: bool,
    #[serde(default = "default_firehose_url")]
    pub firehose_url: String,
    #[serde(default = "default_mock_min_length")]
    pub mock_min_status_length: usize,
    #[serde(default = "default_mock_max_length")]
    pub mock_max_status_length: usize,
    #[serde(default = "default_mock_sleep_ms")]
    pub mock_sleep_ms: u64,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("FIREHOSE_CAPTURE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Checks the cross-field invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.retry.validate()?;

        if self.kafka.brokers.is_empty() {
            return Err(Error::Config("kafka.brokers must not be empty".to_string()));
        }
        if self.kafka.topic_name.trim().is_empty() {
            return Err(Error::Config("kafka.topic_name must not be empty".to_string()));
        }
        if self.kafka.num_partitions < 1 {
            return Err(Error::Config(
                "kafka.num_partitions must be at least 1".to_string(),
            ));
        }
        if self
            .kafka
            .topic_names_to_create
            .iter()
            .any(|name| name.trim().is_empty())
        {
            return Err(Error::Config(
                "kafka.topic_names_to_create must not contain empty names".to_string(),
            ));
        }
        if self.stream.keywords.is_empty() {
            return Err(Error::Config("stream.keywords must not be empty".to_string()));
        }
        if self.stream.mock_min_status_length == 0
            || self.stream.mock_min_status_length > self.stream.mock_max_status_length
        {
            return Err(Error::Config(
                "stream.mock_min_status_length must be in 1..=stream.mock_max_status_length"
                    .to_string(),
            ));
        }
        if self.stream.mock_sleep_ms == 0 {
            return Err(Error::Config(
                "stream.mock_sleep_ms must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// The topics the startup gate must create and confirm, with
    /// trimmed names and the configured partition layout.
    pub fn topic_specs(&self) -> Vec<TopicSpec> {
        self.kafka
            .topic_names_to_create
            .iter()
            .map(|name| TopicSpec {
                name: name.trim().to_string(),
                partitions: self.kafka.num_partitions,
                replication_factor: self.kafka.replication_factor,
            })
            .collect()
    }
}

fn default_num_partitions() -> i32 {
    3
}

fn default_replication_factor() -> i32 {
    1
}

fn default_registry_timeout() -> u64 {
    10
}

fn default_compression() -> String {
    "snappy".to_string()
}

fn default_acks() -> String {
    "all".to_string()
}

fn default_linger_ms() -> u32 {
    100
}

fn default_batch_size() -> usize {
    16384
}

fn default_buffer_memory() -> usize {
    33_554_432 // 32MB
}

fn default_firehose_url() -> String {
    "https://stream.example.com/statuses/filter".to_string()
}

fn default_mock_min_length() -> usize {
    5
}

fn default_mock_max_length() -> usize {
    15
}

fn default_mock_sleep_ms() -> u64 {
    1000
}
