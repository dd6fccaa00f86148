//! Process-local state

pub mod ledger;

pub use ledger::{PendingRequest, RequestLedger};
