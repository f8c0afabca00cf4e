use crate::config::StreamConfig;
use crate::event::RawStatus;
use crate::source::StatusListener;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::info;

const WORDS: [&str; 20] = [
    "lorem",
    "ipsum",
    "dolor",
    "sit",
    "amet",
    "consectetur",
    "adipiscing",
    "elit",
    "sed",
    "do",
    "eiusmod",
    "tempor",
    "incididunt",
    "ut",
    "labore",
    "et",
    "dolore",
    "magna",
    "aliqua",
    "enim",
];

/// Synthesizes raw statuses from an instance-held vocabulary and
/// random source, so tests can seed the generator and substitute the
/// word list.
pub struct StatusGenerator {
    words: Vec<String>,
    keywords: Vec<String>,
    min_words: usize,
    max_words: usize,
    rng: StdRng,
}

impl StatusGenerator {
    pub fn new(keywords: Vec<String>, min_words: usize, max_words: usize, rng: StdRng) -> Self {
        Self {
            words: WORDS.iter().map(|word| word.to_string()).collect(),
            keywords,
            min_words,
            max_words,
            rng,
        }
    }

    pub fn with_vocabulary(mut self, words: Vec<String>) -> Self {
        self.words = words;
        self
    }

    pub fn next_status(&mut self) -> RawStatus {
        let text = self.next_text();
        RawStatus::new(
            self.rng.gen_range(0..i64::MAX),
            self.rng.gen_range(0..i64::MAX),
            text,
            Utc::now(),
        )
    }

    /// Draws `word_count` words uniformly from the vocabulary and
    /// places one keyword at the midpoint index `word_count / 2`. The
    /// text always contains exactly `word_count` words.
    fn next_text(&mut self) -> String {
        let word_count = self.rng.gen_range(self.min_words..=self.max_words);

        let mut words: Vec<String> = (0..word_count)
            .filter_map(|_| self.words.choose(&mut self.rng).cloned())
            .collect();

        if let Some(keyword) = self.keywords.choose(&mut self.rng) {
            words[word_count / 2] = keyword.clone();
        }

        words.join(" ")
    }
}

/// Synthetic stream source: one dedicated background worker looping
/// generate, deliver, sleep.
pub struct MockStreamSource {
    keywords: Vec<String>,
    min_words: usize,
    max_words: usize,
    sleep: Duration,
    listener: Arc<dyn StatusListener>,
    worker: Option<JoinHandle<()>>,
}

impl MockStreamSource {
    pub fn new(stream: &StreamConfig, listener: Arc<dyn StatusListener>) -> Self {
        Self {
            keywords: stream.keywords.clone(),
            min_words: stream.mock_min_status_length,
            max_words: stream.mock_max_status_length,
            sleep: Duration::from_millis(stream.mock_sleep_ms),
            listener,
            worker: None,
        }
    }

    pub fn start(&mut self) {
        info!(keywords = ?self.keywords, "Starting mock filtering firehose stream");

        let mut generator = StatusGenerator::new(
            self.keywords.clone(),
            self.min_words,
            self.max_words,
            StdRng::from_entropy(),
        );
        let listener = Arc::clone(&self.listener);
        let sleep = self.sleep;

        self.worker = Some(tokio::spawn(async move {
            loop {
                let status = generator.next_status();
                listener.on_status(status);
                tokio::time::sleep(sleep).await;
            }
        }));
    }

    /// Cancels the worker at its next await point; no further statuses
    /// are delivered after this returns.
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.abort();
            info!("Mock firehose stream shutdown");
        }
    }
}
