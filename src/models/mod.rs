pub mod document;
pub mod enums;
pub mod observation;
pub mod report;
pub mod subject;

pub use document::*;
pub use enums::*;
pub use observation::*;
pub use report::*;
pub use subject::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },
}
