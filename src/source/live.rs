use crate::config::StreamConfig;
use crate::event::RawStatus;
use crate::retry::RetryPolicy;
use crate::source::StatusListener;
use crate::Result;
use bytes::BytesMut;
use futures::StreamExt;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Subscription to the external firehose, filtered by keywords.
///
/// The endpoint serves newline-delimited JSON statuses; one worker
/// task owns the connection and delivers each parsed status into the
/// listener synchronously, in arrival order. Dropped connections are
/// re-established under the retry policy's initial-interval schedule;
/// the attempt budget resets after every successful connection.
pub struct LiveStreamSource {
    url: String,
    keywords: Vec<String>,
    policy: RetryPolicy,
    listener: Arc<dyn StatusListener>,
    worker: Option<JoinHandle<()>>,
}

impl LiveStreamSource {
    pub fn new(stream: &StreamConfig, policy: RetryPolicy, listener: Arc<dyn StatusListener>) -> Self {
        Self {
            url: stream.firehose_url.clone(),
            keywords: stream.keywords.clone(),
            policy,
            listener,
            worker: None,
        }
    }

    pub fn start(&mut self) {
        info!(
            url = %self.url,
            keywords = ?self.keywords,
            "Started filtering firehose stream"
        );

        let client = reqwest::Client::new();
        let url = self.url.clone();
        let track = self.keywords.join(",");
        let policy = self.policy.clone();
        let listener = Arc::clone(&self.listener);

        self.worker = Some(tokio::spawn(async move {
            stream_worker(client, url, track, policy, listener).await;
        }));
    }

    /// Aborting the worker drops the connection, so in-flight delivery
    /// ceases promptly.
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
            info!("Firehose stream shutdown");
        }
    }
}

async fn stream_worker(
    client: reqwest::Client,
    url: String,
    track: String,
    policy: RetryPolicy,
    listener: Arc<dyn StatusListener>,
) {
    let mut backoff = policy.backoff();
    let mut attempts = 0u32;

    loop {
        match connect_and_deliver(&client, &url, &track, listener.as_ref()).await {
            Ok(delivered) => {
                warn!(delivered, "Firehose stream ended, reconnecting");
                backoff = policy.backoff();
                attempts = 0;
                tokio::time::sleep(backoff.next_interval()).await;
            }
            Err(e) => {
                attempts += 1;
                if attempts > policy.max_attempts {
                    error!(
                        error = %e,
                        "Reached max number of retries reconnecting to the firehose, giving up"
                    );
                    return;
                }
                let wait = backoff.next_interval();
                warn!(
                    error = %e,
                    attempt = attempts,
                    wait_ms = wait.as_millis() as u64,
                    "Firehose connection failed, backing off"
                );
                tokio::time::sleep(wait).await;
            }
        }
    }
}

/// Holds one firehose connection open and feeds the listener until the
/// server closes the stream. Returns the number of delivered statuses.
async fn connect_and_deliver(
    client: &reqwest::Client,
    url: &str,
    track: &str,
    listener: &dyn StatusListener,
) -> Result<usize> {
    let response = client
        .get(url)
        .query(&[("track", track)])
        .send()
        .await?
        .error_for_status()?;

    info!(url = %url, "Connected to firehose stream");

    let mut stream = response.bytes_stream();
    let mut buffer = BytesMut::new();
    let mut delivered = 0usize;

    while let Some(chunk) = stream.next().await {
        buffer.extend_from_slice(&chunk?);

        while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
            let line = buffer.split_to(pos + 1);
            let line = trim_line(&line);
            // Blank lines are keep-alives.
            if line.is_empty() {
                continue;
            }

            match serde_json::from_slice::<RawStatus>(line) {
                Ok(status) => {
                    listener.on_status(status);
                    delivered += 1;
                }
                Err(e) => {
                    warn!(error = %e, "Skipping malformed status line");
                }
            }
        }
    }

    Ok(delivered)
}

fn trim_line(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && (line[end - 1] == b'\n' || line[end - 1] == b'\r') {
        end -= 1;
    }
    &line[..end]
}
