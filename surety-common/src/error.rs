use thiserror::Error;

use crate::types::Address;

/// Represents errors that can occur while processing surety operations,
/// including authorization checks, idempotency violations, and oracle
/// protocol violations.
///
/// Callers are expected to treat [`SuretyError::RequestFinalized`] and
/// [`SuretyError::AlreadyRegistered`] as benign races (another submitter got
/// there first); every other variant signals a caller bug or an
/// authorization failure to surface to the end user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SuretyError {
    /// The caller lacks the role or identity required for the operation
    /// (e.g., a non-owner toggling the operational switch).
    #[error("Caller is not authorized for this operation")]
    Unauthorized,

    /// The operational flag is off; all state-mutating operations are
    /// rejected until the owner re-enables the contract.
    #[error("Contract is paused")]
    ContractPaused,

    /// The proposing airline is not an admitted, funded participant and may
    /// not vote on candidates.
    #[error("Airline '{0}' is not an admitted, funded participant")]
    NotAuthorized(Address),

    /// The airline is not eligible to perform the operation (not admitted,
    /// or admitted but not funded).
    #[error("Airline '{0}' is not eligible (must be admitted and funded)")]
    AirlineNotEligible(Address),

    /// The deposited amount is below the required floor for this operation
    /// (airline stake or oracle registration fee).
    #[error("Insufficient funding: required {required}, provided {provided}")]
    InsufficientFunding { required: u64, provided: u64 },

    /// The insurance premium is zero or exceeds the per-policy cap.
    #[error("Premium {0} is out of range")]
    PremiumOutOfRange(u64),

    /// A flight with the same (airline, code, timestamp) key already exists.
    #[error("Flight '{0}' is already registered")]
    DuplicateFlight(String),

    /// The passenger already holds a policy for this flight.
    #[error("Passenger '{0}' already holds a policy for flight '{1}'")]
    DuplicatePolicy(Address, String),

    /// The oracle already attested for this request, regardless of the
    /// status code it submitted.
    #[error("Oracle '{0}' already responded to this request")]
    DuplicateResponse(Address),

    /// The oracle identity was registered before; index assignments are
    /// immutable and cannot be re-drawn.
    #[error("Oracle '{0}' is already registered")]
    AlreadyRegistered(Address),

    /// The flight's status code was finalized before and cannot change.
    #[error("Flight '{0}' status is already finalized")]
    AlreadyFinalized(String),

    /// No flight exists under the given key.
    #[error("Flight '{0}' is not registered")]
    UnknownFlight(String),

    /// The responding identity never registered as an oracle.
    #[error("Oracle '{0}' is not registered")]
    UnknownOracle(Address),

    /// No open request exists for the given (index, flight) pair.
    #[error("No open oracle request for index {index} on flight '{flight}'")]
    RequestNotFound { index: u8, flight: String },

    /// The submitted index is not one of the oracle's three assigned
    /// indexes.
    #[error("Index {0} is not assigned to oracle '{1}'")]
    IndexMismatch(u8, Address),

    /// The request already reached quorum; late responses are rejected but
    /// harmless.
    #[error("Oracle request for flight '{0}' is already finalized")]
    RequestFinalized(String),

    /// The requested withdrawal exceeds the passenger's credited balance.
    #[error("Insufficient credit: available {available}, requested {requested}")]
    InsufficientCredit { available: u64, requested: u64 },
}

pub type Result<T> = std::result::Result<T, SuretyError>;
