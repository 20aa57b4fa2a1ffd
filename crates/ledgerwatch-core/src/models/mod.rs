//! Data models for LedgerWatch

mod explorer;
mod key;

pub use explorer::*;
pub use key::*;
