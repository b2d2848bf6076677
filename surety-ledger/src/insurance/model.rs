use serde::{Deserialize, Serialize};
use surety_common::types::{Address, FlightKey};

/// A passenger's policy on one flight.
///
/// `paid` flips to `true` exactly once, when the flight finalizes as an
/// airline-caused delay; `credit` then holds the amount owed until the
/// passenger withdraws it (pull-payment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsurancePolicy {
    pub passenger: Address,
    pub flight: FlightKey,
    pub premium: u64,
    pub paid: bool,
    pub credit: u64,
}

impl InsurancePolicy {
    pub fn new(passenger: Address, flight: FlightKey, premium: u64) -> Self {
        Self {
            passenger,
            flight,
            premium,
            paid: false,
            credit: 0,
        }
    }
}
