//! Collector module - concurrent balance lookups
//!
//! The collector fans one lookup task out per key, reads each explorer page
//! through the extractor, and joins every result back in input order.

mod dispatcher;
mod extractor;
mod fetcher;

pub use dispatcher::Dispatcher;
pub use extractor::{extract, Extraction, Extractor};
pub use fetcher::{ContinueInput, Fetcher};

use std::sync::Arc;

use tracing::info;

use crate::config::{RunConfig, DEFAULT_CONCURRENCY};
use crate::error::Result;
use crate::models::Key;

/// Operating mode flags for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Report every key, not only failures
    pub verbose: bool,
    /// One lookup at a time, pausing for enter after each
    pub debug: bool,
    /// Maximum lookups in flight outside debug mode
    pub concurrency: usize,
}

impl RunOptions {
    /// Concurrency limit after applying debug mode
    pub fn effective_concurrency(&self) -> usize {
        if self.debug {
            1
        } else {
            self.concurrency.max(1)
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            verbose: false,
            debug: false,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Looks up every configured key against the configured explorer
pub struct Collector {
    dispatcher: Dispatcher,
    keys: Vec<Key>,
}

impl Collector {
    /// Build the fetcher and dispatcher for a run
    pub fn new(config: &RunConfig, options: RunOptions) -> Result<Self> {
        let fetcher = Fetcher::new(config.explorer.clone(), options)?;
        Ok(Self::with_fetcher(fetcher, config.ltc_keys.clone(), options))
    }

    /// Build a collector around an existing fetcher
    pub fn with_fetcher(fetcher: Fetcher, keys: Vec<Key>, options: RunOptions) -> Self {
        Self {
            dispatcher: Dispatcher::new(Arc::new(fetcher), options.effective_concurrency()),
            keys,
        }
    }

    /// Run every lookup and return the keys in configuration order
    pub async fn collect(&self) -> Result<Vec<Key>> {
        info!(keys = self.keys.len(), "Starting balance lookups");
        self.dispatcher.dispatch(self.keys.clone()).await
    }
}
