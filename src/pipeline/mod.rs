pub mod build;
pub mod dedup;
pub mod ingest;
pub mod normalize;

pub use build::*;
pub use dedup::*;
pub use ingest::*;
pub use normalize::*;

use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum IngestError {
    /// The referenced subject is not registered. Fatal, no retry.
    #[error("Unknown subject: {0}")]
    UnknownSubject(Uuid),

    /// Normalization found zero usable content and zero metadata.
    #[error("Document has no usable content")]
    EmptyDocument,

    /// Storage-level failure; retryable when the inner error is.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl IngestError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_retryable(),
            _ => false,
        }
    }
}
