use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use surety_common::error::{Result, SuretyError};
use surety_common::index_source::IndexSource;
use surety_common::types::{Address, ORACLE_INDEX_SPACE, REGISTRATION_FEE};
use tracing::info;

/// An oracle identity and its three assigned indexes.
///
/// Indexes are drawn once at registration and never change; an oracle may
/// only respond to requests opened under one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRegistration {
    pub address: Address,
    pub indexes: [u8; 3],
}

impl OracleRegistration {
    pub fn has_index(&self, index: u8) -> bool {
        self.indexes.contains(&index)
    }
}

/// Registry of fee-paying oracles.
#[derive(Debug, Default)]
pub struct OracleRegistry {
    oracles: HashMap<Address, OracleRegistration>,
}

impl OracleRegistry {
    pub fn new() -> Self {
        Self {
            oracles: HashMap::new(),
        }
    }

    /// Registers an oracle, drawing three distinct indexes from `source`.
    ///
    /// # Errors
    /// - [`SuretyError::InsufficientFunding`] if the fee is below the
    ///   registration fee.
    /// - [`SuretyError::AlreadyRegistered`] on a second registration for the
    ///   same address; index assignments are immutable.
    pub fn register(
        &mut self,
        address: Address,
        fee: u64,
        source: &mut dyn IndexSource,
    ) -> Result<[u8; 3]> {
        if fee < REGISTRATION_FEE {
            return Err(SuretyError::InsufficientFunding {
                required: REGISTRATION_FEE,
                provided: fee,
            });
        }
        if self.oracles.contains_key(&address) {
            return Err(SuretyError::AlreadyRegistered(address));
        }

        let indexes = Self::draw_distinct(source);
        info!("🔮 Oracle {} registered with indexes {:?}", address, indexes);
        self.oracles
            .insert(address.clone(), OracleRegistration { address, indexes });
        Ok(indexes)
    }

    /// The oracle's assigned indexes, as handed out at registration.
    pub fn indexes_of(&self, address: &Address) -> Result<[u8; 3]> {
        self.oracles
            .get(address)
            .map(|o| o.indexes)
            .ok_or_else(|| SuretyError::UnknownOracle(address.clone()))
    }

    pub fn get(&self, address: &Address) -> Option<&OracleRegistration> {
        self.oracles.get(address)
    }

    pub fn is_registered(&self, address: &Address) -> bool {
        self.oracles.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.oracles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.oracles.is_empty()
    }

    // Resamples duplicates so the three indexes are distinct. The index
    // space is 10, so this terminates quickly for any non-degenerate source.
    fn draw_distinct(source: &mut dyn IndexSource) -> [u8; 3] {
        let mut indexes = [0u8; 3];
        let mut filled = 0;
        while filled < 3 {
            let candidate = source.draw(ORACLE_INDEX_SPACE);
            if !indexes[..filled].contains(&candidate) {
                indexes[filled] = candidate;
                filled += 1;
            }
        }
        indexes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed draw sequence, cycling when exhausted.
    struct ScriptedSource {
        draws: Vec<u8>,
        at: usize,
    }

    impl ScriptedSource {
        fn new(draws: Vec<u8>) -> Self {
            Self { draws, at: 0 }
        }
    }

    impl IndexSource for ScriptedSource {
        fn draw(&mut self, _space: u8) -> u8 {
            let v = self.draws[self.at % self.draws.len()];
            self.at += 1;
            v
        }
    }

    #[test]
    fn test_registration_assigns_three_distinct_indexes() {
        let mut registry = OracleRegistry::new();
        let mut source = ScriptedSource::new(vec![7, 7, 2, 9]);

        let indexes = registry
            .register(Address::from("O-1"), REGISTRATION_FEE, &mut source)
            .unwrap();
        // The duplicate 7 was resampled.
        assert_eq!(indexes, [7, 2, 9]);
        assert_eq!(registry.indexes_of(&Address::from("O-1")).unwrap(), [7, 2, 9]);
    }

    #[test]
    fn test_double_registration_rejected() {
        let mut registry = OracleRegistry::new();
        let mut source = ScriptedSource::new(vec![1, 2, 3]);

        registry
            .register(Address::from("O-1"), REGISTRATION_FEE, &mut source)
            .unwrap();
        let err = registry
            .register(Address::from("O-1"), REGISTRATION_FEE, &mut source)
            .unwrap_err();
        assert_eq!(err, SuretyError::AlreadyRegistered(Address::from("O-1")));
    }

    #[test]
    fn test_fee_below_floor_rejected() {
        let mut registry = OracleRegistry::new();
        let mut source = ScriptedSource::new(vec![1, 2, 3]);

        let err = registry
            .register(Address::from("O-1"), REGISTRATION_FEE - 1, &mut source)
            .unwrap_err();
        assert!(matches!(err, SuretyError::InsufficientFunding { .. }));
        assert!(!registry.is_registered(&Address::from("O-1")));
    }

    #[test]
    fn test_indexes_of_unknown_oracle() {
        let registry = OracleRegistry::new();
        let err = registry.indexes_of(&Address::from("O-9")).unwrap_err();
        assert_eq!(err, SuretyError::UnknownOracle(Address::from("O-9")));
    }
}
