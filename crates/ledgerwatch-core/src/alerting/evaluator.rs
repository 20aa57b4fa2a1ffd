//! Threshold evaluation over collected balances

use std::io::Write;

use tracing::{debug, info};

use crate::config::{AlertPolicy, RunConfig};
use crate::error::Result;
use crate::models::{AlertChannel, Key};

use super::notifier::Notifier;

/// Decides which keys are below the minimum and sends their alerts
#[derive(Debug, Clone, Copy)]
pub struct AlertEvaluator {
    min_value: f64,
    policy: AlertPolicy,
}

impl AlertEvaluator {
    /// Create a new alert evaluator
    pub fn new(min_value: f64, policy: AlertPolicy) -> Self {
        Self { min_value, policy }
    }

    /// Create an evaluator from the run configuration
    pub fn from_config(config: &RunConfig) -> Self {
        Self::new(config.min_value, config.alert_policy)
    }

    /// Whether a key's value is strictly below the minimum under the policy
    pub fn check(&self, key: &Key) -> bool {
        match self.policy {
            AlertPolicy::Numeric => key.value() < self.min_value,
            AlertPolicy::DeterminedOnly => key.is_determined() && key.value() < self.min_value,
        }
    }

    /// Keys that warrant an alert, in result order
    pub fn evaluate<'a>(&self, results: &'a [Key]) -> Vec<&'a Key> {
        self.flagged(results)
            .into_iter()
            .map(|index| &results[index])
            .collect()
    }

    /// Positions of the keys that warrant an alert
    fn flagged(&self, results: &[Key]) -> Vec<usize> {
        let flagged: Vec<usize> = results
            .iter()
            .enumerate()
            .filter(|(_, key)| self.check(key))
            .map(|(index, _)| index)
            .collect();

        debug!(
            checked = results.len(),
            flagged = flagged.len(),
            min_value = self.min_value,
            policy = ?self.policy,
            "Evaluated balances"
        );

        flagged
    }

    /// Send one alert per flagged key, in result order, and return the
    /// positions of the alerted keys.
    ///
    /// An `- Alert! <name>` line is written to `out` before each delivery,
    /// so alerts sent before a failure are still visible. Stops at the
    /// first delivery failure; alerts sent before it stay sent.
    pub async fn notify_all(
        &self,
        results: &[Key],
        channel: &AlertChannel,
        notifier: &dyn Notifier,
        out: &mut (dyn Write + Send),
    ) -> Result<Vec<usize>> {
        let flagged = self.flagged(results);

        for &index in &flagged {
            let key = &results[index];
            info!(
                name = %key.name,
                address = %key.address,
                value = key.value(),
                min_value = self.min_value,
                "Alert triggered"
            );
            writeln!(out, "- Alert! {}", key.name)?;
            out.flush()?;
            notifier.notify(channel, key).await?;
        }

        Ok(flagged)
    }
}
