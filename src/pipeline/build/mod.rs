pub mod builder;
pub mod codes;
pub mod ranges;
pub mod values;

pub use builder::*;
pub use codes::*;
pub use ranges::*;
pub use values::*;
