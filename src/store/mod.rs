mod backup;
mod remote;

pub use backup::BackupStore;
pub use remote::RemoteStore;

use thiserror::Error;

// Closed set of store outcomes; callers match on these. A timeout is
// handled the same way as an unreachable store everywhere.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store operation timed out")]
    Timeout,
    #[error("key not found")]
    NotFound,
    #[error("malformed data: {0}")]
    Malformed(String),
}
