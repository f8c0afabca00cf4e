//! Error types and result handling for firehose-capture.
//!
//! This module defines the main error type [`Error`] and a convenience
//! [`Result`] type alias used throughout the crate.
//!
//! # Example
//!
//! ```rust
//! use firehose_capture::{Error, Result};
//!
//! fn check_broker() -> Result<()> {
//!     // Simulating exhausted startup retries
//!     Err(Error::Startup {
//!         message: "Reached max number of retries for reading kafka topics".to_string(),
//!     })
//! }
//!
//! match check_broker() {
//!     Ok(()) => println!("Broker ready"),
//!     Err(Error::Startup { message }) => eprintln!("Startup aborted: {}", message),
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use thiserror::Error;

/// The main error type for firehose-capture operations.
///
/// This enum represents all possible errors that can occur while
/// bringing the broker to readiness and streaming statuses into it,
/// from configuration issues to runtime failures.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error, typically from an invalid file or environment variable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Kafka client, admin or producer error.
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    /// HTTP transport error reaching the schema registry or the firehose endpoint.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization error when encoding outbound events.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Startup readiness exhausted its retry budget.
    ///
    /// The process must not begin consuming the stream when this is
    /// returned; there is no partial-success state to resume from.
    #[error("Startup error: {message}")]
    Startup {
        /// Description of which readiness step gave up
        message: String,
    },
}

/// A convenient Result type alias for firehose-capture operations.
///
/// This is equivalent to `std::result::Result<T, firehose_capture::Error>`.
///
/// # Example
///
/// ```rust
/// use firehose_capture::Result;
///
/// fn do_something() -> Result<String> {
///     Ok("Success".to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;
