use serde_json::json;
use surety_common::index_source::IndexSource;
use surety_common::types::Address;
use surety_ledger::airlines::AirlineRegistry;
use surety_ledger::flights::FlightRegistry;
use surety_ledger::insurance::InsuranceLedger;
use surety_oracle::{OracleRegistry, RequestState, ResponsePool};

/// The single authoritative state of the surety core.
///
/// Owned exclusively by [`crate::FlightSuretyCore`] behind one lock; every
/// operation validates and mutates it inside one critical section, so a
/// failed call never leaves a partial update behind.
pub struct State {
    pub operational: bool,
    pub owner: Address,
    pub airlines: AirlineRegistry,
    pub flights: FlightRegistry,
    pub insurance: InsuranceLedger,
    pub oracles: OracleRegistry,
    pub requests: ResponsePool,
    /// Funds held by the core: airline stakes, oracle fees and escrowed
    /// premiums, less withdrawals. Observability only; payout safety is
    /// enforced by the per-passenger credit balances.
    pub treasury: u64,
    pub index_source: Box<dyn IndexSource>,
}

impl State {
    /// Creates the initial state. The owner doubles as the first admitted
    /// airline, mirroring the airline seeded at deployment.
    pub fn new(owner: Address, index_source: Box<dyn IndexSource>) -> Self {
        let mut airlines = AirlineRegistry::new();
        airlines.bootstrap(owner.clone());
        Self {
            operational: true,
            owner,
            airlines,
            flights: FlightRegistry::new(),
            insurance: InsuranceLedger::new(),
            oracles: OracleRegistry::new(),
            requests: ResponsePool::new(),
            treasury: 0,
            index_source,
        }
    }

    /// JSON view of the externally observable state, for inspection and
    /// test verification.
    pub fn snapshot(&self) -> serde_json::Value {
        json!({
            "operational": self.operational,
            "owner": self.owner,
            "treasury": self.treasury,
            "airlines": self.airlines.iter().collect::<Vec<_>>(),
            "flights": self.flights.iter().collect::<Vec<_>>(),
            "policies": self.insurance.iter().collect::<Vec<_>>(),
            "oracles": self.oracles.len(),
            "open_requests": self
                .requests
                .iter()
                .filter(|r| r.state == RequestState::Open)
                .count(),
        })
    }
}
