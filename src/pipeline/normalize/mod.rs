pub mod header;
pub mod normalizer;
pub mod types;

pub use header::*;
pub use normalizer::*;
pub use types::*;
