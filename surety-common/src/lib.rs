pub mod error;
pub mod index_source;
pub mod types;
pub mod utils;

pub use error::{Result, SuretyError};
