use std::fmt;

use serde::{Deserialize, Serialize};

/// One value unit expressed in base denomination. All amounts in the ledger
/// are `u64` counts of base units so that fractional payouts (the 1.5x
/// multiplier) stay in integer arithmetic.
pub const UNIT: u64 = 1_000_000_000;

/// Minimum stake an airline must deposit before it may vote or register
/// flights.
pub const FUNDING_THRESHOLD: u64 = 10 * UNIT;

/// Fee an oracle pays when registering its identity.
pub const REGISTRATION_FEE: u64 = UNIT;

/// Largest premium a passenger may pay for a single policy.
pub const MAX_PREMIUM: u64 = UNIT;

/// Number of independent matching attestations required to finalize an
/// oracle request.
pub const MIN_RESPONSES: usize = 3;

/// Oracle indexes are drawn from `0..ORACLE_INDEX_SPACE`.
pub const ORACLE_INDEX_SPACE: u8 = 10;

/// Number of admitted airlines below which a single funded proposer admits a
/// candidate directly; at or above it, multi-party voting applies.
pub const CONSENSUS_AIRLINE_COUNT: usize = 4;

/// Opaque participant identity (airline, passenger, oracle or owner).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub String);

impl Address {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Authoritative status code of a flight.
///
/// The numeric codes are the wire values oracles attest with; `LateAirline`
/// is the only status that triggers insurance payouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    Unknown,
    OnTime,
    LateAirline,
    LateWeather,
    LateTechnical,
    LateOther,
}

impl FlightStatus {
    /// Numeric wire code of this status.
    pub fn code(&self) -> u8 {
        match self {
            FlightStatus::Unknown => 0,
            FlightStatus::OnTime => 10,
            FlightStatus::LateAirline => 20,
            FlightStatus::LateWeather => 30,
            FlightStatus::LateTechnical => 40,
            FlightStatus::LateOther => 50,
        }
    }

    /// Parses a numeric wire code. Unrecognized codes map to `None`.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FlightStatus::Unknown),
            10 => Some(FlightStatus::OnTime),
            20 => Some(FlightStatus::LateAirline),
            30 => Some(FlightStatus::LateWeather),
            40 => Some(FlightStatus::LateTechnical),
            50 => Some(FlightStatus::LateOther),
            _ => None,
        }
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FlightStatus::Unknown => "Unknown",
            FlightStatus::OnTime => "OnTime",
            FlightStatus::LateAirline => "LateAirline",
            FlightStatus::LateWeather => "LateWeather",
            FlightStatus::LateTechnical => "LateTechnical",
            FlightStatus::LateOther => "LateOther",
        };
        write!(f, "{}", label)
    }
}

/// Unique flight identity: owning airline, flight code and scheduled
/// departure timestamp (UNIX seconds).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlightKey {
    pub airline: Address,
    pub code: String,
    pub timestamp: u64,
}

impl FlightKey {
    pub fn new(airline: Address, code: impl Into<String>, timestamp: u64) -> Self {
        Self {
            airline,
            code: code.into(),
            timestamp,
        }
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.airline, self.code, self.timestamp)
    }
}
