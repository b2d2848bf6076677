use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use surety_common::types::Address;

/// Admission state of an airline.
///
/// A `Pending` airline has been proposed (and may be accumulating votes) but
/// is not yet part of the trusted set; an `Admitted` airline counts toward
/// the consensus denominator and, once funded, may vote and register
/// flights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdmissionStatus {
    Pending,
    Admitted,
}

/// A participating (or candidate) airline.
///
/// Created on the first admission request naming this address. The
/// `approvals` set holds the distinct funded airlines that voted for the
/// candidate; it drives the multi-party admission predicate once the
/// trusted set reaches the consensus threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Airline {
    pub address: Address,
    pub admission: AdmissionStatus,
    pub funded: bool,
    pub approvals: HashSet<Address>,
}

impl Airline {
    /// Creates a candidate airline awaiting admission votes.
    pub fn pending(address: Address) -> Self {
        Self {
            address,
            admission: AdmissionStatus::Pending,
            funded: false,
            approvals: HashSet::new(),
        }
    }

    /// Returns `true` once the airline is part of the trusted set.
    pub fn is_admitted(&self) -> bool {
        self.admission == AdmissionStatus::Admitted
    }

    /// Returns `true` if the airline may vote and register flights.
    pub fn is_participant(&self) -> bool {
        self.is_admitted() && self.funded
    }
}
