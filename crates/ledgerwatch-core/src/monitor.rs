//! One monitoring run: collect, evaluate, alert

use std::io::Write;

use tracing::info;

use crate::alerting::{AlertEvaluator, Notifier};
use crate::collector::{Collector, RunOptions};
use crate::config::RunConfig;
use crate::error::Result;
use crate::models::Key;

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Every key, in configuration order
    pub results: Vec<Key>,
    /// Positions in `results` of the keys an alert was sent for
    pub alerted: Vec<usize>,
}

impl RunSummary {
    /// Keys an alert was sent for, in result order
    pub fn alerted_keys(&self) -> impl Iterator<Item = &Key> {
        self.alerted.iter().map(|&index| &self.results[index])
    }

    /// Whether an alert was sent for the key at `index`
    pub fn is_alerted(&self, index: usize) -> bool {
        self.alerted.binary_search(&index).is_ok()
    }

    /// Number of keys whose explorer lookup failed
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|k| !k.is_success()).count()
    }
}

/// Drives a single pass over every configured key
pub struct Monitor {
    config: RunConfig,
    options: RunOptions,
}

impl Monitor {
    /// Create a monitor for a validated configuration
    pub fn new(config: RunConfig, options: RunOptions) -> Self {
        Self { config, options }
    }

    /// Configuration this monitor runs with
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Look up every key, then alert on the ones below the minimum.
    ///
    /// All lookups finish before the first alert is sent. Alert lines are
    /// written to `out` as each alert goes out.
    pub async fn run(
        &self,
        notifier: &dyn Notifier,
        out: &mut (dyn Write + Send),
    ) -> Result<RunSummary> {
        let collector = Collector::new(&self.config, self.options)?;
        self.run_with(&collector, notifier, out).await
    }

    /// Same as [`Monitor::run`] with a prepared collector
    pub async fn run_with(
        &self,
        collector: &Collector,
        notifier: &dyn Notifier,
        out: &mut (dyn Write + Send),
    ) -> Result<RunSummary> {
        let results = collector.collect().await?;

        let evaluator = AlertEvaluator::from_config(&self.config);
        let alerted = evaluator
            .notify_all(&results, &self.config.email_alert, notifier, out)
            .await?;

        let summary = RunSummary { results, alerted };

        info!(
            keys = summary.results.len(),
            failed = summary.failed(),
            alerted = summary.alerted.len(),
            "Run complete"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerting::NotificationError;
    use crate::config::{AlertPolicy, LoggingConfig};
    use crate::error::Error;
    use crate::models::{AlertChannel, Explorer, Outcome, UNDETERMINED_VALUE};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Default)]
    struct Outbox(Mutex<Vec<String>>);

    #[async_trait]
    impl Notifier for Outbox {
        async fn notify(
            &self,
            _channel: &AlertChannel,
            key: &Key,
        ) -> std::result::Result<(), NotificationError> {
            self.0.lock().unwrap().push(key.address.clone());
            Ok(())
        }
    }

    struct BrokenRelay;

    #[async_trait]
    impl Notifier for BrokenRelay {
        async fn notify(
            &self,
            _channel: &AlertChannel,
            _key: &Key,
        ) -> std::result::Result<(), NotificationError> {
            Err(NotificationError::HttpError("connection reset".to_string()))
        }
    }

    fn config_for(server: &MockServer, addresses: &[&str]) -> RunConfig {
        RunConfig {
            explorer: Explorer::new(
                "mock",
                format!("{}/address/%s", server.uri()),
                r"Balance: (\d+\.\d+)",
            ),
            min_value: 1.0,
            ltc_keys: addresses
                .iter()
                .map(|a| Key::new(*a, format!("name-{a}")))
                .collect(),
            email_alert: AlertChannel {
                from: "monitor@example.com".to_string(),
                to: "ops@example.com".to_string(),
            },
            concurrency: 4,
            alert_policy: AlertPolicy::Numeric,
            logging: LoggingConfig::default(),
        }
    }

    async fn page(server: &MockServer, address: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/address/{address}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_healthy_balance_sends_no_alert() {
        let server = MockServer::start().await;
        page(&server, "LTC1rich", "Balance: 2.50000000 LTC").await;

        let monitor = Monitor::new(config_for(&server, &["LTC1rich"]), RunOptions::default());
        let outbox = Outbox::default();

        let summary = monitor.run(&outbox, &mut std::io::sink()).await.unwrap();

        let key = &summary.results[0];
        assert_eq!(key.outcome, Outcome::Success { value: 2.5 });
        assert!(key.is_success());
        assert!(summary.alerted.is_empty());
        assert!(outbox.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_balance_alerts_under_numeric_policy() {
        let server = MockServer::start().await;
        page(&server, "LTC1gone", "<p>No such address</p>").await;

        let monitor = Monitor::new(config_for(&server, &["LTC1gone"]), RunOptions::default());
        let outbox = Outbox::default();

        let summary = monitor.run(&outbox, &mut std::io::sink()).await.unwrap();

        assert_eq!(summary.results[0].value(), UNDETERMINED_VALUE);
        assert_eq!(summary.alerted, vec![0]);
        assert_eq!(*outbox.0.lock().unwrap(), vec!["LTC1gone"]);
    }

    #[tokio::test]
    async fn test_mixed_run_alerts_low_and_failed_keys() {
        let server = MockServer::start().await;
        page(&server, "LTC1rich", "Balance: 7.00000000 LTC").await;
        page(&server, "LTC1poor", "Balance: 0.01000000 LTC").await;
        Mock::given(method("GET"))
            .and(path("/address/LTC1down"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let monitor = Monitor::new(
            config_for(&server, &["LTC1rich", "LTC1down", "LTC1poor"]),
            RunOptions::default(),
        );
        let outbox = Outbox::default();

        let summary = monitor.run(&outbox, &mut std::io::sink()).await.unwrap();

        assert_eq!(summary.failed(), 1);
        assert_eq!(*outbox.0.lock().unwrap(), vec!["LTC1down", "LTC1poor"]);
    }

    #[tokio::test]
    async fn test_determined_only_policy_ignores_failures() {
        let server = MockServer::start().await;
        page(&server, "LTC1poor", "Balance: 0.01000000 LTC").await;
        page(&server, "LTC1gone", "nothing here").await;

        let mut config = config_for(&server, &["LTC1poor", "LTC1gone"]);
        config.alert_policy = AlertPolicy::DeterminedOnly;
        let outbox = Outbox::default();

        Monitor::new(config, RunOptions::default())
            .run(&outbox, &mut std::io::sink())
            .await
            .unwrap();

        assert_eq!(*outbox.0.lock().unwrap(), vec!["LTC1poor"]);
    }

    #[tokio::test]
    async fn test_notifier_failure_aborts_run() {
        let server = MockServer::start().await;
        page(&server, "LTC1poor", "Balance: 0.01000000 LTC").await;

        let monitor = Monitor::new(config_for(&server, &["LTC1poor"]), RunOptions::default());

        let mut out = Vec::new();

        let result = monitor.run(&BrokenRelay, &mut out).await;

        assert!(matches!(result, Err(Error::Notification(_))));
        assert_eq!(String::from_utf8(out).unwrap(), "- Alert! name-LTC1poor\n");
    }
}
