use serde::{Deserialize, Serialize};
use surety_common::types::{Address, FlightKey, FlightStatus};

/// Notifications published by the core for its external collaborators.
///
/// The oracle responder listens for [`CoreEvent::OracleRequestOpened`] and
/// answers with `submit_oracle_response`; the dapp client observes the
/// remaining events to update its view. Events are broadcast best-effort: a
/// lagging or absent subscriber never blocks or fails the operation that
/// produced the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreEvent {
    /// A status request was opened; oracles holding `index` should respond.
    OracleRequestOpened { index: u8, flight: FlightKey },
    /// An attestation was accepted but quorum is not yet reached.
    OracleReport {
        flight: FlightKey,
        status: FlightStatus,
        matching: usize,
    },
    /// Quorum was reached and the flight status was finalized.
    FlightStatusFinalized {
        flight: FlightKey,
        status: FlightStatus,
    },
    /// A policy was credited following an airline-caused delay.
    PolicyCredited {
        passenger: Address,
        flight: FlightKey,
        amount: u64,
    },
}
