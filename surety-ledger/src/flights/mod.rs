pub mod model;
pub mod registry;

pub use model::Flight;
pub use registry::FlightRegistry;
