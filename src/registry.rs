use crate::readiness::HealthProbe;
use crate::Result;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// HTTP health probe against the schema registry.
///
/// Readiness is decided by the caller: this client only reports the
/// status code of one GET against the configured URL. Request timeouts
/// are bounded by the client configuration, not by the startup gate.
pub struct SchemaRegistryClient {
    client: reqwest::Client,
    url: String,
}

impl SchemaRegistryClient {
    pub fn new(url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl HealthProbe for SchemaRegistryClient {
    async fn probe(&self) -> Result<u16> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status().as_u16();
        debug!(url = %self.url, status, "Schema registry probe");
        Ok(status)
    }
}
