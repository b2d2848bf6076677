use std::collections::HashMap;

use surety_common::error::{Result, SuretyError};
use surety_common::types::{Address, FlightKey, FlightStatus, MAX_PREMIUM};
use tracing::info;

use super::model::InsurancePolicy;

/// Escrow ledger of insurance policies and passenger credits.
///
/// Premiums are escrowed at purchase time. When a flight finalizes as
/// `LateAirline`, every unpaid policy on it is credited 3/2 of its premium;
/// the credit sits on the policy until the passenger pulls it out with
/// [`InsuranceLedger::withdraw`].
#[derive(Debug, Default, Clone)]
pub struct InsuranceLedger {
    policies: HashMap<(Address, FlightKey), InsurancePolicy>,
    escrowed: u64,
}

impl InsuranceLedger {
    pub fn new() -> Self {
        Self {
            policies: HashMap::new(),
            escrowed: 0,
        }
    }

    /// Sells a policy to `passenger` on `flight`, escrowing the premium.
    ///
    /// Flight existence is checked by the caller, which holds the flight
    /// registry.
    ///
    /// # Errors
    /// - [`SuretyError::PremiumOutOfRange`] unless `0 < premium <= MAX_PREMIUM`.
    /// - [`SuretyError::DuplicatePolicy`] if the passenger already holds a
    ///   policy on this flight.
    pub fn buy(&mut self, passenger: Address, flight: FlightKey, premium: u64) -> Result<()> {
        if premium == 0 || premium > MAX_PREMIUM {
            return Err(SuretyError::PremiumOutOfRange(premium));
        }

        let policy_key = (passenger.clone(), flight.clone());
        if self.policies.contains_key(&policy_key) {
            return Err(SuretyError::DuplicatePolicy(passenger, flight.to_string()));
        }

        self.escrowed += premium;
        info!("🎫 Policy sold to {} on flight {} (premium {})", policy_key.0, flight, premium);
        self.policies
            .insert(policy_key, InsurancePolicy::new(passenger, flight, premium));
        Ok(())
    }

    /// Reacts to a finalized flight status.
    ///
    /// For `LateAirline` only, every unpaid policy on the flight is marked
    /// paid and credited `premium * 3 / 2`. Integer division truncates
    /// toward zero on odd premium amounts. Any other status leaves the
    /// policies unpaid permanently.
    ///
    /// Returns the `(passenger, amount)` grants made by this call; crediting
    /// happens at most once per policy.
    pub fn on_flight_finalized(
        &mut self,
        flight: &FlightKey,
        status: FlightStatus,
    ) -> Vec<(Address, u64)> {
        if status != FlightStatus::LateAirline {
            return Vec::new();
        }

        let mut grants = Vec::new();
        for policy in self
            .policies
            .values_mut()
            .filter(|p| &p.flight == flight && !p.paid)
        {
            let grant = policy.premium * 3 / 2;
            policy.paid = true;
            policy.credit += grant;
            info!(
                "💸 Credited {} to {} for flight {}",
                grant, policy.passenger, flight
            );
            grants.push((policy.passenger.clone(), grant));
        }
        grants
    }

    /// Total credit currently owed to the passenger across all policies.
    pub fn credits(&self, passenger: &Address) -> u64 {
        self.policies
            .values()
            .filter(|p| &p.passenger == passenger)
            .map(|p| p.credit)
            .sum()
    }

    pub fn policy(&self, passenger: &Address, flight: &FlightKey) -> Option<&InsurancePolicy> {
        self.policies.get(&(passenger.clone(), flight.clone()))
    }

    /// Withdraws `amount` from the passenger's credited balance.
    ///
    /// The balance is drained from the policy records before the caller
    /// performs the outbound transfer, so a transfer that cannot complete
    /// never leaves a double-spendable credit behind.
    ///
    /// # Errors
    /// Returns [`SuretyError::InsufficientCredit`] if `amount` exceeds the
    /// balance; the balance is left untouched in that case.
    pub fn withdraw(&mut self, passenger: &Address, amount: u64) -> Result<u64> {
        let available = self.credits(passenger);
        if amount > available {
            return Err(SuretyError::InsufficientCredit {
                available,
                requested: amount,
            });
        }

        let mut remaining = amount;
        for policy in self
            .policies
            .values_mut()
            .filter(|p| &p.passenger == passenger && p.credit > 0)
        {
            let take = remaining.min(policy.credit);
            policy.credit -= take;
            remaining -= take;
            if remaining == 0 {
                break;
            }
        }

        info!("💰 Passenger {} withdrew {}", passenger, amount);
        Ok(amount)
    }

    /// Sum of all premiums escrowed since creation.
    pub fn escrowed(&self) -> u64 {
        self.escrowed
    }

    pub fn iter(&self) -> impl Iterator<Item = &InsurancePolicy> {
        self.policies.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use surety_common::types::UNIT;

    fn flight() -> FlightKey {
        FlightKey::new(Address::from("AL-0"), "XX0XX", 123456789)
    }

    #[test]
    fn test_duplicate_policy_rejected() {
        let mut ledger = InsuranceLedger::new();
        let passenger = Address::from("P-1");

        ledger.buy(passenger.clone(), flight(), UNIT).unwrap();
        let err = ledger.buy(passenger, flight(), UNIT / 2).unwrap_err();
        assert!(matches!(err, SuretyError::DuplicatePolicy(_, _)));
    }

    #[test]
    fn test_premium_bounds() {
        let mut ledger = InsuranceLedger::new();
        let passenger = Address::from("P-1");

        let err = ledger.buy(passenger.clone(), flight(), 0).unwrap_err();
        assert!(matches!(err, SuretyError::PremiumOutOfRange(0)));

        let err = ledger.buy(passenger, flight(), MAX_PREMIUM + 1).unwrap_err();
        assert!(matches!(err, SuretyError::PremiumOutOfRange(_)));
    }

    #[test]
    fn test_credit_is_one_and_a_half_premiums() {
        let mut ledger = InsuranceLedger::new();
        let passenger = Address::from("P-1");
        ledger.buy(passenger.clone(), flight(), UNIT).unwrap();

        let grants = ledger.on_flight_finalized(&flight(), FlightStatus::LateAirline);
        assert_eq!(grants, vec![(passenger.clone(), 3 * UNIT / 2)]);

        let policy = ledger.policy(&passenger, &flight()).unwrap();
        assert!(policy.paid);
        assert_eq!(policy.credit, 3 * UNIT / 2);
        assert_eq!(ledger.credits(&passenger), 3 * UNIT / 2);
    }

    #[test]
    fn test_credit_granted_at_most_once() {
        let mut ledger = InsuranceLedger::new();
        let passenger = Address::from("P-1");
        ledger.buy(passenger.clone(), flight(), UNIT).unwrap();

        ledger.on_flight_finalized(&flight(), FlightStatus::LateAirline);
        let second = ledger.on_flight_finalized(&flight(), FlightStatus::LateAirline);
        assert!(second.is_empty());
        assert_eq!(ledger.credits(&passenger), 3 * UNIT / 2);
    }

    #[test]
    fn test_no_credit_for_other_statuses() {
        let mut ledger = InsuranceLedger::new();
        let passenger = Address::from("P-1");
        ledger.buy(passenger.clone(), flight(), UNIT).unwrap();

        for status in [
            FlightStatus::OnTime,
            FlightStatus::LateWeather,
            FlightStatus::LateTechnical,
            FlightStatus::LateOther,
        ] {
            assert!(ledger.on_flight_finalized(&flight(), status).is_empty());
        }
        assert_eq!(ledger.credits(&passenger), 0);
        assert!(!ledger.policy(&passenger, &flight()).unwrap().paid);
    }

    #[test]
    fn test_odd_premium_truncates() {
        let mut ledger = InsuranceLedger::new();
        let passenger = Address::from("P-1");
        ledger.buy(passenger.clone(), flight(), 3).unwrap();

        ledger.on_flight_finalized(&flight(), FlightStatus::LateAirline);
        // 3 * 3 / 2 = 4 (truncated from 4.5)
        assert_eq!(ledger.credits(&passenger), 4);
    }

    #[test]
    fn test_withdraw_decrements_balance() {
        let mut ledger = InsuranceLedger::new();
        let passenger = Address::from("P-1");
        ledger.buy(passenger.clone(), flight(), UNIT).unwrap();
        ledger.on_flight_finalized(&flight(), FlightStatus::LateAirline);

        ledger.withdraw(&passenger, UNIT).unwrap();
        assert_eq!(ledger.credits(&passenger), UNIT / 2);

        ledger.withdraw(&passenger, UNIT / 2).unwrap();
        assert_eq!(ledger.credits(&passenger), 0);
    }

    #[test]
    fn test_overdraw_rejected_and_balance_unchanged() {
        let mut ledger = InsuranceLedger::new();
        let passenger = Address::from("P-1");
        ledger.buy(passenger.clone(), flight(), UNIT).unwrap();
        ledger.on_flight_finalized(&flight(), FlightStatus::LateAirline);

        let err = ledger.withdraw(&passenger, 2 * UNIT).unwrap_err();
        assert_eq!(
            err,
            SuretyError::InsufficientCredit {
                available: 3 * UNIT / 2,
                requested: 2 * UNIT,
            }
        );
        assert_eq!(ledger.credits(&passenger), 3 * UNIT / 2);
    }

    #[test]
    fn test_withdraw_spans_multiple_policies() {
        let mut ledger = InsuranceLedger::new();
        let passenger = Address::from("P-1");
        let other = FlightKey::new(Address::from("AL-1"), "YY1YY", 42);

        ledger.buy(passenger.clone(), flight(), UNIT).unwrap();
        ledger.buy(passenger.clone(), other.clone(), UNIT).unwrap();
        ledger.on_flight_finalized(&flight(), FlightStatus::LateAirline);
        ledger.on_flight_finalized(&other, FlightStatus::LateAirline);

        assert_eq!(ledger.credits(&passenger), 3 * UNIT);
        ledger.withdraw(&passenger, 2 * UNIT).unwrap();
        assert_eq!(ledger.credits(&passenger), UNIT);
    }
}
