pub mod airlines;
pub mod flights;
pub mod insurance;
