//! Single-key explorer lookups

use reqwest::{Client, StatusCode};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::{Explorer, Key, Outcome};

use super::extractor::Extractor;
use super::RunOptions;

/// Line source that releases a debug pause
pub type ContinueInput = Box<dyn AsyncBufRead + Send + Unpin>;

/// Looks up one key at a time against a single explorer
pub struct Fetcher {
    client: Client,
    explorer: Explorer,
    extractor: Extractor,
    options: RunOptions,
    // one reader for the whole run, so buffered lines carry over between pauses
    continue_input: Mutex<ContinueInput>,
}

impl Fetcher {
    /// Create a fetcher with a default HTTP client
    pub fn new(explorer: Explorer, options: RunOptions) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ledgerwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Self::with_client(client, explorer, options)
    }

    /// Create a fetcher around an existing HTTP client
    pub fn with_client(client: Client, explorer: Explorer, options: RunOptions) -> Result<Self> {
        let extractor = Extractor::new(&explorer.regexp)?;

        Ok(Self {
            client,
            explorer,
            extractor,
            options,
            continue_input: Mutex::new(Box::new(BufReader::new(tokio::io::stdin()))),
        })
    }

    /// Read debug-pause confirmations from `input` instead of stdin
    #[must_use]
    pub fn with_continue_input(mut self, input: ContinueInput) -> Self {
        self.continue_input = Mutex::new(input);
        self
    }

    /// Explorer this fetcher reads from
    pub fn explorer(&self) -> &Explorer {
        &self.explorer
    }

    /// Look up `key` and record the outcome on it.
    ///
    /// Fetch failures are recorded on the key and never returned as errors.
    /// The only error is a non-numeric capture, which aborts the run.
    pub async fn fetch(&self, mut key: Key) -> Result<Key> {
        if self.options.verbose {
            info!(name = %key.name, "Processing key");
        }

        let url = self.explorer.request_url(&key.address);

        match self.get_body(&url).await {
            Ok(body) => {
                let extraction = self.extractor.extract(&body)?;
                key.record(extraction.into());

                debug!(
                    address = %key.address,
                    value = key.value(),
                    "Lookup complete"
                );
            }
            Err(failure) => {
                key.outcome = failure;
                warn!(
                    address = %key.address,
                    url = %url,
                    error = %key.error_message(),
                    "Lookup failed"
                );
            }
        }

        if self.options.debug {
            self.wait_for_continue().await?;
        }

        Ok(key)
    }

    /// GET the page, mapping anything but a readable 200 to a failed outcome
    async fn get_body(&self, url: &str) -> std::result::Result<String, Outcome> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Outcome::FetchFailed {
                reason: e.to_string(),
                status: e.status().map_or(0, |s| s.as_u16()),
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Outcome::FetchFailed {
                reason: status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| Outcome::FetchFailed {
            reason: format!("failed to read body: {e}"),
            status: status.as_u16(),
        })
    }

    /// Hold the lookup until the operator presses enter. End of input
    /// releases every later pause.
    async fn wait_for_continue(&self) -> Result<()> {
        println!("<Press Enter To Continue>");

        let mut line = String::new();
        let mut input = self.continue_input.lock().await;
        if input.read_line(&mut line).await? == 0 {
            debug!("Continue input closed");
        }
        Ok(())
    }
}
