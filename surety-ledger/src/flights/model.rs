use serde::{Deserialize, Serialize};
use surety_common::types::{FlightKey, FlightStatus};

/// A flight offered for insurance, identified by (airline, code, timestamp).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub key: FlightKey,
    pub status: FlightStatus,
}

impl Flight {
    pub fn new(key: FlightKey) -> Self {
        Self {
            key,
            status: FlightStatus::Unknown,
        }
    }

    /// Status is finalized once it leaves `Unknown`.
    pub fn is_finalized(&self) -> bool {
        self.status != FlightStatus::Unknown
    }
}
