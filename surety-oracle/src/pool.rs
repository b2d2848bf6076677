use std::collections::{HashMap, HashSet};

use surety_common::error::{Result, SuretyError};
use surety_common::types::{Address, FlightKey, FlightStatus, MIN_RESPONSES};
use tracing::info;

use crate::registry::OracleRegistration;

/// Lifecycle of an oracle request. A request opens when a flight status is
/// requested and finalizes when any status code gathers quorum; there is no
/// expiry, so a request that never reaches quorum stays open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Open,
    Finalized,
}

/// An open (or finalized) status request, keyed by (index, flight).
///
/// `responses` buckets attesting oracles by the status code they submitted;
/// `responders` enforces one response per oracle regardless of status value.
#[derive(Debug, Clone)]
pub struct OracleRequest {
    pub index: u8,
    pub flight: FlightKey,
    responses: HashMap<FlightStatus, HashSet<Address>>,
    responders: HashSet<Address>,
    pub state: RequestState,
}

impl OracleRequest {
    fn new(index: u8, flight: FlightKey) -> Self {
        Self {
            index,
            flight,
            responses: HashMap::new(),
            responders: HashSet::new(),
            state: RequestState::Open,
        }
    }

    /// Number of oracles that attested the given status so far.
    pub fn matching(&self, status: FlightStatus) -> usize {
        self.responses.get(&status).map(|s| s.len()).unwrap_or(0)
    }

    /// Total number of distinct responders.
    pub fn responders(&self) -> usize {
        self.responders.len()
    }
}

/// Outcome of an accepted oracle response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// The attestation was recorded; quorum not yet reached for its status.
    Accepted { matching: usize },
    /// The attestation completed the quorum; the request finalized with the
    /// agreed status.
    Quorum { status: FlightStatus },
}

/// Accumulates oracle attestations per request until quorum.
#[derive(Debug, Default)]
pub struct ResponsePool {
    requests: HashMap<(u8, FlightKey), OracleRequest>,
}

impl ResponsePool {
    pub fn new() -> Self {
        Self {
            requests: HashMap::new(),
        }
    }

    /// Opens a status request for (index, flight).
    ///
    /// Reopening an existing request is a no-op, so attestations already
    /// gathered are never discarded. Returns `true` if a new request was
    /// created.
    pub fn open(&mut self, index: u8, flight: FlightKey) -> bool {
        let key = (index, flight.clone());
        if self.requests.contains_key(&key) {
            return false;
        }
        info!("🔍 Oracle request opened for flight {} under index {}", flight, index);
        tracing::info!(target: "oracle", "EVENT:REQUEST index={} flight={}", index, flight);
        self.requests.insert(key, OracleRequest::new(index, flight));
        true
    }

    /// Records one oracle's attestation for an open request.
    ///
    /// Checks, in order: the submitted index is one of the oracle's assigned
    /// indexes (`IndexMismatch`), a request exists for (index, flight)
    /// (`RequestNotFound`), the request is still open (`RequestFinalized`),
    /// and this oracle has not responded to the request before, regardless
    /// of status value (`DuplicateResponse`).
    ///
    /// When the attested status reaches [`MIN_RESPONSES`] distinct oracles,
    /// the request transitions to `Finalized` and the agreed status is
    /// returned; later responses for the request are rejected.
    pub fn submit(
        &mut self,
        oracle: &OracleRegistration,
        index: u8,
        flight: &FlightKey,
        status: FlightStatus,
    ) -> Result<ResponseOutcome> {
        if !oracle.has_index(index) {
            return Err(SuretyError::IndexMismatch(index, oracle.address.clone()));
        }

        let request = self
            .requests
            .get_mut(&(index, flight.clone()))
            .ok_or_else(|| SuretyError::RequestNotFound {
                index,
                flight: flight.to_string(),
            })?;

        if request.state == RequestState::Finalized {
            return Err(SuretyError::RequestFinalized(flight.to_string()));
        }
        if !request.responders.insert(oracle.address.clone()) {
            return Err(SuretyError::DuplicateResponse(oracle.address.clone()));
        }

        let bucket = request.responses.entry(status).or_default();
        bucket.insert(oracle.address.clone());
        let matching = bucket.len();

        info!(
            "🔮 Oracle {} attested {} for flight {} ({}/{})",
            oracle.address, status, flight, matching, MIN_RESPONSES
        );

        if matching >= MIN_RESPONSES {
            request.state = RequestState::Finalized;
            tracing::info!(target: "oracle", "EVENT:QUORUM index={} flight={} status={}", index, flight, status.code());
            return Ok(ResponseOutcome::Quorum { status });
        }

        Ok(ResponseOutcome::Accepted { matching })
    }

    pub fn get(&self, index: u8, flight: &FlightKey) -> Option<&OracleRequest> {
        self.requests.get(&(index, flight.clone()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &OracleRequest> {
        self.requests.values()
    }
}
