pub mod ledger;
pub mod model;

pub use ledger::InsuranceLedger;
pub use model::InsurancePolicy;
