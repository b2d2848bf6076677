pub mod model;
pub mod registry;

pub use model::{AdmissionStatus, Airline};
pub use registry::{AdmissionOutcome, AirlineRegistry};
