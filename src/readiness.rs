//! Startup readiness orchestration.
//!
//! Before the stream source starts, the broker must hold every
//! configured topic and the schema registry must answer its health
//! probe. [`StartupGate`] drives both checks with bounded exponential
//! backoff and blocks the bootstrap task for the whole retry duration.
//! Exhausting a retry budget is fatal: the caller must abort startup.
//!
//! The gate talks to the outside world only through the [`BrokerAdmin`]
//! and [`HealthProbe`] ports, so tests substitute in-process fakes.

use crate::retry::RetryPolicy;
use crate::{Error, Result};
use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// A topic the gate must create and confirm on the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSpec {
    pub name: String,
    pub partitions: i32,
    pub replication_factor: i32,
}

/// Capability seam to the broker's administrative API.
#[async_trait]
pub trait BrokerAdmin: Send + Sync {
    /// Submits a creation request for all specs in one call.
    async fn create_topics(&self, specs: &[TopicSpec]) -> Result<()>;

    /// Returns a fresh snapshot of the topic names the broker holds.
    async fn list_topics(&self) -> Result<Vec<String>>;
}

/// Capability seam to a health-checkable remote dependency.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Returns the HTTP status code of one health probe.
    async fn probe(&self) -> Result<u16>;
}

pub struct StartupGate<A, H> {
    admin: A,
    probe: H,
    policy: RetryPolicy,
}

impl<A: BrokerAdmin, H: HealthProbe> StartupGate<A, H> {
    pub fn new(admin: A, probe: H, policy: RetryPolicy) -> Self {
        Self {
            admin,
            probe,
            policy,
        }
    }

    /// Creates the topics and blocks until the broker lists every one
    /// of them.
    ///
    /// Submission failures are transient broker unavailability and are
    /// retried immediately, without delay, up to `max_attempts` total
    /// submissions. Confirmation then polls the topic listing under the
    /// policy's confirmation backoff; one attempt counter and one
    /// growing interval span the whole invocation, so confirmation of
    /// a later topic inherits the interval left over from the earlier
    /// ones.
    pub async fn ensure_topics(&self, specs: &[TopicSpec]) -> Result<()> {
        let mut attempt = 1u32;
        loop {
            info!(attempt, topics = specs.len(), "Submitting topic creation request");
            match self.admin.create_topics(specs).await {
                Ok(()) => break,
                Err(e) => {
                    if attempt >= self.policy.max_attempts {
                        return Err(Error::Startup {
                            message: format!(
                                "topic creation request failed after {} attempts: {}",
                                attempt, e
                            ),
                        });
                    }
                    warn!(attempt, error = %e, "Topic creation request failed, retrying");
                    attempt += 1;
                }
            }
        }

        self.confirm_topics(specs).await
    }

    async fn confirm_topics(&self, specs: &[TopicSpec]) -> Result<()> {
        let mut backoff = self.policy.confirmation_backoff();
        let mut checks = 0u32;
        let mut topics = self.list_topics_or_empty().await;

        for spec in specs {
            while !topics.iter().any(|name| name == &spec.name) {
                checks += 1;
                if checks > self.policy.max_attempts {
                    return Err(Error::Startup {
                        message: format!(
                            "Reached max number of retries ({}) waiting for topic '{}' to appear",
                            self.policy.max_attempts, spec.name
                        ),
                    });
                }
                let wait = backoff.next_interval();
                info!(
                    topic = %spec.name,
                    attempt = checks,
                    wait_ms = wait.as_millis() as u64,
                    "Topic not visible yet, backing off"
                );
                sleep(wait).await;
                topics = self.list_topics_or_empty().await;
            }
            debug!(topic = %spec.name, "Topic confirmed");
        }

        info!(topics = specs.len(), "All topics confirmed on the broker");
        Ok(())
    }

    /// A listing transport error means the broker cannot answer yet;
    /// the empty snapshot keeps the confirmation loop polling on the
    /// same schedule instead of failing early.
    async fn list_topics_or_empty(&self) -> Vec<String> {
        match self.admin.list_topics().await {
            Ok(topics) => topics,
            Err(e) => {
                warn!(error = %e, "Listing topics failed, treating all topics as not visible");
                Vec::new()
            }
        }
    }

    /// Polls the schema registry health probe until it answers with a
    /// 2xx status.
    ///
    /// A transport error coerces to a synthetic 503 and stays on the
    /// retry schedule. Returns immediately, without sleeping, when the
    /// first probe already succeeds.
    pub async fn await_schema_registry(&self) -> Result<()> {
        let mut backoff = self.policy.confirmation_backoff();
        let mut attempts = 0u32;

        loop {
            let status = match self.probe.probe().await {
                Ok(status) => status,
                Err(e) => {
                    warn!(error = %e, "Schema registry probe failed, treating as unavailable");
                    503
                }
            };

            if (200..300).contains(&status) {
                info!(status, "Schema registry is ready");
                return Ok(());
            }

            attempts += 1;
            if attempts > self.policy.max_attempts {
                return Err(Error::Startup {
                    message: format!(
                        "Reached max number of retries ({}) waiting for the schema registry",
                        self.policy.max_attempts
                    ),
                });
            }
            let wait = backoff.next_interval();
            info!(
                status,
                attempt = attempts,
                wait_ms = wait.as_millis() as u64,
                "Schema registry not ready, backing off"
            );
            sleep(wait).await;
        }
    }
}
