//! Bounded-concurrency fan-out of key lookups

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::Key;

use super::fetcher::Fetcher;

/// Runs one lookup task per key, at most `concurrency` at a time
pub struct Dispatcher {
    fetcher: Arc<Fetcher>,
    concurrency: usize,
}

type Joined = std::result::Result<Result<(usize, Key)>, tokio::task::JoinError>;

impl Dispatcher {
    /// Create a dispatcher; a limit of 0 is treated as 1
    pub fn new(fetcher: Arc<Fetcher>, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
        }
    }

    /// Effective concurrency limit
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Look up every key and return them in input order.
    ///
    /// Returns only once every task has finished. The first fatal error
    /// aborts the remaining tasks and is returned instead of any results.
    pub async fn dispatch(&self, keys: Vec<Key>) -> Result<Vec<Key>> {
        let total = keys.len();
        let gate = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks: JoinSet<Result<(usize, Key)>> = JoinSet::new();
        let mut slots: Vec<Option<Key>> = vec![None; total];

        info!(
            keys = total,
            concurrency = self.concurrency,
            "Dispatching lookups"
        );

        for (index, key) in keys.into_iter().enumerate() {
            // Collect finished lookups while waiting for a slot so a fatal
            // error stops admission early.
            let permit = loop {
                tokio::select! {
                    permit = Arc::clone(&gate).acquire_owned() => {
                        break permit.map_err(|e| Error::internal(e.to_string()))?;
                    }
                    Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                        place(&mut slots, joined)?;
                    }
                }
            };

            let fetcher = Arc::clone(&self.fetcher);
            tasks.spawn(async move {
                let _permit = permit;
                fetcher.fetch(key).await.map(|key| (index, key))
            });
        }

        while let Some(joined) = tasks.join_next().await {
            place(&mut slots, joined)?;
        }

        debug!(keys = total, "All lookups finished");

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| Error::internal(format!("no result for key #{index}")))
            })
            .collect()
    }
}

fn place(slots: &mut [Option<Key>], joined: Joined) -> Result<()> {
    let (index, key) = joined??;
    slots[index] = Some(key);
    Ok(())
}
