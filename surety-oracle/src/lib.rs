pub mod pool;
pub mod registry;

pub use pool::{OracleRequest, RequestState, ResponseOutcome, ResponsePool};
pub use registry::{OracleRegistration, OracleRegistry};
