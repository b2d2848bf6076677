use std::collections::HashMap;

use surety_common::error::{Result, SuretyError};
use surety_common::types::{Address, CONSENSUS_AIRLINE_COUNT, FUNDING_THRESHOLD};
use tracing::info;

use super::model::{AdmissionStatus, Airline};

/// Outcome of an admission request, surfaced to the caller so the external
/// collaborator can decide whether to keep gathering votes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionOutcome {
    /// The candidate joined the trusted set with this request.
    Admitted,
    /// The candidate was already admitted; the request was a no-op.
    AlreadyAdmitted,
    /// The vote was recorded but the majority threshold is not yet met.
    VoteRecorded { approvals: usize, admitted: usize },
}

/// Registry of airlines and the multi-party admission consensus.
///
/// Admission policy: while fewer than [`CONSENSUS_AIRLINE_COUNT`] airlines
/// are admitted, a single funded proposer admits a candidate directly.
/// From then on each funded airline casts one idempotent vote, and the
/// candidate is admitted as soon as `2 * |approvals| >= admitted_count`
/// (ties at exactly half admit), evaluated after every vote.
#[derive(Debug, Default, Clone)]
pub struct AirlineRegistry {
    airlines: HashMap<Address, Airline>,
}

impl AirlineRegistry {
    pub fn new() -> Self {
        Self {
            airlines: HashMap::new(),
        }
    }

    /// Admits the first airline without a proposer. Used once when the
    /// ledger is created, mirroring the airline seeded at deployment.
    pub fn bootstrap(&mut self, address: Address) {
        let mut airline = Airline::pending(address.clone());
        airline.admission = AdmissionStatus::Admitted;
        self.airlines.insert(address.clone(), airline);
        info!("🛫 Bootstrapped first airline {}", address);
    }

    /// Marks an airline as funded after it deposited its stake.
    ///
    /// Re-funding an already-funded airline is a no-op success.
    ///
    /// # Errors
    /// - [`SuretyError::InsufficientFunding`] if `amount` is below the
    ///   funding threshold.
    /// - [`SuretyError::AirlineNotEligible`] if no admitted airline exists
    ///   under `address`.
    pub fn fund(&mut self, address: &Address, amount: u64) -> Result<()> {
        if amount < FUNDING_THRESHOLD {
            return Err(SuretyError::InsufficientFunding {
                required: FUNDING_THRESHOLD,
                provided: amount,
            });
        }

        let airline = self
            .airlines
            .get_mut(address)
            .filter(|a| a.is_admitted())
            .ok_or_else(|| SuretyError::AirlineNotEligible(address.clone()))?;

        if !airline.funded {
            airline.funded = true;
            info!("💰 Airline {} funded with {}", address, amount);
        }
        Ok(())
    }

    /// Handles an admission request for `candidate` proposed by `proposer`.
    ///
    /// Requesting admission for an unknown candidate implicitly creates its
    /// pending record; re-voting by the same proposer has no effect.
    ///
    /// # Errors
    /// Returns [`SuretyError::NotAuthorized`] unless the proposer is an
    /// admitted, funded airline.
    pub fn register(&mut self, candidate: &Address, proposer: &Address) -> Result<AdmissionOutcome> {
        if !self.is_participant(proposer) {
            return Err(SuretyError::NotAuthorized(proposer.clone()));
        }
        if self.is_airline(candidate) {
            return Ok(AdmissionOutcome::AlreadyAdmitted);
        }

        let admitted = self.admitted_count();
        let entry = self
            .airlines
            .entry(candidate.clone())
            .or_insert_with(|| Airline::pending(candidate.clone()));

        if admitted < CONSENSUS_AIRLINE_COUNT {
            entry.admission = AdmissionStatus::Admitted;
            entry.approvals.clear();
            info!("🛫 Airline {} admitted directly by {}", candidate, proposer);
            tracing::info!(target: "airlines", "EVENT:ADMITTED airline={} mode=direct", candidate);
            return Ok(AdmissionOutcome::Admitted);
        }

        entry.approvals.insert(proposer.clone());
        let approvals = entry.approvals.len();

        if approvals * 2 >= admitted {
            entry.admission = AdmissionStatus::Admitted;
            info!(
                "🛫 Airline {} admitted by consensus ({}/{} votes)",
                candidate, approvals, admitted
            );
            tracing::info!(target: "airlines", "EVENT:ADMITTED airline={} mode=consensus votes={}", candidate, approvals);
            return Ok(AdmissionOutcome::Admitted);
        }

        info!(
            "🗳️ Vote recorded for airline {} ({}/{} votes, by {})",
            candidate, approvals, admitted, proposer
        );
        Ok(AdmissionOutcome::VoteRecorded {
            approvals,
            admitted,
        })
    }

    /// Returns `true` if the address belongs to an admitted airline.
    pub fn is_airline(&self, address: &Address) -> bool {
        self.airlines
            .get(address)
            .map(|a| a.is_admitted())
            .unwrap_or(false)
    }

    /// Returns `true` if the airline deposited its stake.
    pub fn is_funded(&self, address: &Address) -> bool {
        self.airlines
            .get(address)
            .map(|a| a.funded)
            .unwrap_or(false)
    }

    /// Returns `true` if the airline may vote and register flights.
    pub fn is_participant(&self, address: &Address) -> bool {
        self.airlines
            .get(address)
            .map(|a| a.is_participant())
            .unwrap_or(false)
    }

    /// Number of airlines currently admitted (the consensus denominator).
    pub fn admitted_count(&self) -> usize {
        self.airlines.values().filter(|a| a.is_admitted()).count()
    }

    pub fn get(&self, address: &Address) -> Option<&Airline> {
        self.airlines.get(address)
    }

    /// Iterates over every airline record, pending candidates included.
    pub fn iter(&self) -> impl Iterator<Item = &Airline> {
        self.airlines.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn funded_registry(n: usize) -> AirlineRegistry {
        let mut registry = AirlineRegistry::new();
        registry.bootstrap(Address::from("AL-0"));
        registry.fund(&Address::from("AL-0"), FUNDING_THRESHOLD).unwrap();
        for i in 1..n {
            let addr = Address(format!("AL-{}", i));
            registry.register(&addr, &Address::from("AL-0")).unwrap();
            registry.fund(&addr, FUNDING_THRESHOLD).unwrap();
        }
        registry
    }

    #[test]
    fn test_unfunded_proposer_rejected() {
        let mut registry = AirlineRegistry::new();
        registry.bootstrap(Address::from("AL-0"));

        let err = registry
            .register(&Address::from("AL-1"), &Address::from("AL-0"))
            .unwrap_err();
        assert_eq!(err, SuretyError::NotAuthorized(Address::from("AL-0")));
        assert!(!registry.is_airline(&Address::from("AL-1")));
    }

    #[test]
    fn test_direct_admission_below_threshold() {
        let mut registry = funded_registry(1);

        for i in 1..4 {
            let outcome = registry
                .register(&Address(format!("AL-{}", i)), &Address::from("AL-0"))
                .unwrap();
            assert_eq!(outcome, AdmissionOutcome::Admitted);
        }
        assert_eq!(registry.admitted_count(), 4);
    }

    #[test]
    fn test_consensus_required_at_threshold() {
        let mut registry = funded_registry(4);
        let candidate = Address::from("AL-4");

        // 4 admitted airlines: one vote out of 4 is below half.
        let outcome = registry.register(&candidate, &Address::from("AL-0")).unwrap();
        assert_eq!(
            outcome,
            AdmissionOutcome::VoteRecorded {
                approvals: 1,
                admitted: 4
            }
        );
        assert!(!registry.is_airline(&candidate));

        // Second distinct vote reaches 2/4 = 50%.
        let outcome = registry.register(&candidate, &Address::from("AL-1")).unwrap();
        assert_eq!(outcome, AdmissionOutcome::Admitted);
        assert!(registry.is_airline(&candidate));
    }

    #[test]
    fn test_revote_is_idempotent() {
        let mut registry = funded_registry(4);
        let candidate = Address::from("AL-4");

        registry.register(&candidate, &Address::from("AL-0")).unwrap();
        let outcome = registry.register(&candidate, &Address::from("AL-0")).unwrap();
        assert_eq!(
            outcome,
            AdmissionOutcome::VoteRecorded {
                approvals: 1,
                admitted: 4
            }
        );
        assert!(!registry.is_airline(&candidate));
    }

    #[test]
    fn test_registering_admitted_airline_is_noop() {
        let mut registry = funded_registry(2);
        let outcome = registry
            .register(&Address::from("AL-1"), &Address::from("AL-0"))
            .unwrap();
        assert_eq!(outcome, AdmissionOutcome::AlreadyAdmitted);
    }

    #[test]
    fn test_funding_is_idempotent() {
        let mut registry = funded_registry(1);
        let addr = Address::from("AL-0");

        registry.fund(&addr, FUNDING_THRESHOLD).unwrap();
        registry.fund(&addr, FUNDING_THRESHOLD + 5).unwrap();
        assert!(registry.is_funded(&addr));
    }

    #[test]
    fn test_funding_below_threshold_rejected() {
        let mut registry = AirlineRegistry::new();
        registry.bootstrap(Address::from("AL-0"));

        let err = registry
            .fund(&Address::from("AL-0"), FUNDING_THRESHOLD - 1)
            .unwrap_err();
        assert!(matches!(err, SuretyError::InsufficientFunding { .. }));
        assert!(!registry.is_funded(&Address::from("AL-0")));
    }

    #[test]
    fn test_vote_for_unknown_candidate_creates_record() {
        let mut registry = funded_registry(4);
        let candidate = Address::from("AL-9");

        registry.register(&candidate, &Address::from("AL-2")).unwrap();
        let record = registry.get(&candidate).unwrap();
        assert_eq!(record.admission, AdmissionStatus::Pending);
        assert_eq!(record.approvals.len(), 1);
    }
}
