pub mod admin;
pub mod producer;

pub use admin::KafkaAdmin;
pub use producer::{EventProducer, EventSink, ProduceOutcome};
