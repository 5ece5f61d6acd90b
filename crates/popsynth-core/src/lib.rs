pub mod error;
pub mod sample;
pub mod types;

pub use error::*;
pub use types::*;
