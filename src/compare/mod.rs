pub mod engine;
pub mod types;

pub use engine::*;
pub use types::*;

use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}
