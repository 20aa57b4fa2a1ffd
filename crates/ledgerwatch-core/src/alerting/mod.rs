//! Alerting for LedgerWatch
//!
//! Provides threshold evaluation over collected balances and alert delivery.

mod evaluator;
mod notifier;

pub use evaluator::AlertEvaluator;
pub use notifier::{
    AlertMessage, LogNotifier, NotificationError, Notifier, SendGridNotifier,
    SENDGRID_API_KEY_VAR,
};
