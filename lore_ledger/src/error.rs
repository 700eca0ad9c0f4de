//! Error types for the ledger and its storage backends.

use thiserror::Error;

/// Errors raised while constructing ledger values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("fragment id {0} is outside 1..={max}", max = crate::FRAGMENT_COUNT)]
    InvalidFragment(u8),
}

/// Errors raised by a [`LedgerStore`](crate::LedgerStore) backend.
///
/// The ledger never propagates these; they are logged and the in-memory
/// state stays authoritative.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed ledger record: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}
