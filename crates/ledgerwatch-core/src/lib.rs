//! # LedgerWatch
//!
//! Balance monitor for public ledger addresses.
//!
//! LedgerWatch reads each configured address's balance from a block-explorer
//! page and sends an alert email for every balance below a minimum.
//!
//! ## Architecture
//!
//! - **Collector**: Bounded-concurrency lookups with order-preserving results
//! - **Alerting**: Threshold evaluation and SendGrid delivery
//! - **Report**: End-of-run status output
//!
//! ## Quick Start
//!
//! ```bash
//! # Check every key in ./config.yaml
//! ledgerwatch
//!
//! # Show every key, not only failures
//! ledgerwatch -v -c /etc/ledgerwatch.yaml
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod alerting;
pub mod collector;
pub mod config;
pub mod error;
pub mod models;
pub mod monitor;
pub mod report;

pub use config::RunConfig;
pub use error::{Error, Result};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::alerting::{AlertEvaluator, LogNotifier, Notifier, SendGridNotifier};
    pub use crate::collector::{Collector, Dispatcher, Fetcher, RunOptions};
    pub use crate::config::RunConfig;
    pub use crate::error::{Error, Result};
    pub use crate::models::*;
    pub use crate::monitor::{Monitor, RunSummary};
}
