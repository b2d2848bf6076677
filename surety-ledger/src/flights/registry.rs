use std::collections::HashMap;

use surety_common::error::{Result, SuretyError};
use surety_common::types::{FlightKey, FlightStatus};
use tracing::info;

use super::model::Flight;

/// Registry of insurable flights and their authoritative status codes.
#[derive(Debug, Default, Clone)]
pub struct FlightRegistry {
    flights: HashMap<FlightKey, Flight>,
}

impl FlightRegistry {
    pub fn new() -> Self {
        Self {
            flights: HashMap::new(),
        }
    }

    /// Records a new flight with status `Unknown`.
    ///
    /// Eligibility of the owning airline is checked by the caller, which
    /// holds the airline registry.
    pub fn register(&mut self, key: FlightKey) -> Result<()> {
        if self.flights.contains_key(&key) {
            return Err(SuretyError::DuplicateFlight(key.to_string()));
        }
        info!("✈️ Flight {} registered", key);
        self.flights.insert(key.clone(), Flight::new(key));
        Ok(())
    }

    /// Writes the agreed status once quorum was reached.
    ///
    /// # Errors
    /// - [`SuretyError::UnknownFlight`] if no flight exists under `key`.
    /// - [`SuretyError::AlreadyFinalized`] if the status left `Unknown`
    ///   before; the finalize write happens exactly once.
    pub fn set_status(&mut self, key: &FlightKey, status: FlightStatus) -> Result<&Flight> {
        let flight = self
            .flights
            .get_mut(key)
            .ok_or_else(|| SuretyError::UnknownFlight(key.to_string()))?;

        if flight.is_finalized() {
            return Err(SuretyError::AlreadyFinalized(key.to_string()));
        }

        flight.status = status;
        info!("✈️ Flight {} finalized as {}", key, status);
        tracing::info!(target: "flights", "EVENT:FINALIZED flight={} status={}", key, status.code());
        Ok(flight)
    }

    pub fn exists(&self, key: &FlightKey) -> bool {
        self.flights.contains_key(key)
    }

    pub fn get(&self, key: &FlightKey) -> Option<&Flight> {
        self.flights.get(key)
    }

    pub fn status_of(&self, key: &FlightKey) -> Option<FlightStatus> {
        self.flights.get(key).map(|f| f.status)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Flight> {
        self.flights.values()
    }
}
