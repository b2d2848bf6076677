pub mod events;
pub mod state;

use std::sync::Arc;

use surety_common::error::{Result, SuretyError};
use surety_common::index_source::{IndexSource, RandomIndexSource};
use surety_common::types::{Address, FlightKey, FlightStatus, ORACLE_INDEX_SPACE};
use surety_ledger::airlines::AdmissionOutcome;
use surety_ledger::insurance::InsurancePolicy;
use surety_oracle::ResponseOutcome;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, warn};

pub use events::CoreEvent;
pub use state::State;

const EVENT_CHANNEL_CAPACITY: usize = 128;

/// Entry point of the flight surety core.
///
/// Orchestrates airline admission, flight registration, oracle consensus
/// and the insurance escrow over one serialized [`State`]. External
/// collaborators (the dapp client and the oracle responder) call the
/// operations below with the caller identity passed explicitly; the core
/// gates every mutating call on the operational flag.
pub struct FlightSuretyCore {
    state: Arc<RwLock<State>>,
    events: broadcast::Sender<CoreEvent>,
}

impl FlightSuretyCore {
    /// Creates a core with the default random index source.
    pub fn new(owner: Address) -> Self {
        Self::with_index_source(owner, Box::new(RandomIndexSource::new()))
    }

    /// Creates a core with an injected index source. Tests supply a
    /// deterministic source here.
    pub fn with_index_source(owner: Address, index_source: Box<dyn IndexSource>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(RwLock::new(State::new(owner, index_source))),
            events,
        }
    }

    /// Subscribes to core notifications (request openings, finalizations,
    /// credits). Subscribers that lag behind miss older events.
    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: CoreEvent) {
        // No subscribers is fine; events are best-effort.
        let _ = self.events.send(event);
    }

    fn ensure_operational(state: &State) -> Result<()> {
        if !state.operational {
            return Err(SuretyError::ContractPaused);
        }
        Ok(())
    }

    // ---- operations & settings ----

    pub async fn is_operational(&self) -> bool {
        self.state.read().await.operational
    }

    /// Flips the operational switch. Owner only; the switch itself is not
    /// gated on the operational flag, otherwise a paused core could never
    /// be resumed.
    pub async fn set_operating_status(&self, caller: &Address, mode: bool) -> Result<()> {
        let mut state = self.state.write().await;
        if caller != &state.owner {
            return Err(SuretyError::Unauthorized);
        }
        if state.operational != mode {
            state.operational = mode;
            info!("⚙️ Operational status set to {}", mode);
        }
        Ok(())
    }

    // ---- airlines ----

    /// Proposes `candidate` for admission, with the caller as proposer.
    pub async fn register_airline(
        &self,
        candidate: &Address,
        proposer: &Address,
    ) -> Result<AdmissionOutcome> {
        let mut state = self.state.write().await;
        Self::ensure_operational(&state)?;
        state.airlines.register(candidate, proposer)
    }

    /// Deposits the caller's stake. The funding airline is the caller, so
    /// no separate authorization check applies.
    pub async fn fund_airline(&self, airline: &Address, amount: u64) -> Result<()> {
        let mut state = self.state.write().await;
        Self::ensure_operational(&state)?;
        state.airlines.fund(airline, amount)?;
        state.treasury += amount;
        Ok(())
    }

    pub async fn is_airline(&self, address: &Address) -> bool {
        self.state.read().await.airlines.is_airline(address)
    }

    pub async fn is_funded_airline(&self, address: &Address) -> bool {
        self.state.read().await.airlines.is_funded(address)
    }

    // ---- flights ----

    /// Registers a flight owned by the calling airline.
    pub async fn register_flight(
        &self,
        airline: &Address,
        code: &str,
        timestamp: u64,
    ) -> Result<FlightKey> {
        let mut state = self.state.write().await;
        Self::ensure_operational(&state)?;
        if !state.airlines.is_participant(airline) {
            return Err(SuretyError::AirlineNotEligible(airline.clone()));
        }
        let key = FlightKey::new(airline.clone(), code, timestamp);
        state.flights.register(key.clone())?;
        Ok(key)
    }

    pub async fn flight_status(&self, flight: &FlightKey) -> Option<FlightStatus> {
        self.state.read().await.flights.status_of(flight)
    }

    // ---- oracle consensus ----

    /// Opens a status request for `flight` under a freshly drawn index and
    /// notifies subscribed oracles. Returns the index so the caller can
    /// correlate responses.
    pub async fn request_flight_status(&self, flight: &FlightKey) -> Result<u8> {
        let index = {
            let mut state = self.state.write().await;
            Self::ensure_operational(&state)?;
            let index = state.index_source.draw(ORACLE_INDEX_SPACE);
            state.requests.open(index, flight.clone());
            index
        };
        self.emit(CoreEvent::OracleRequestOpened {
            index,
            flight: flight.clone(),
        });
        Ok(index)
    }

    /// Registers the calling oracle and returns its three assigned indexes.
    pub async fn register_oracle(&self, address: &Address, fee: u64) -> Result<[u8; 3]> {
        let mut state = self.state.write().await;
        Self::ensure_operational(&state)?;
        let State {
            oracles,
            index_source,
            treasury,
            ..
        } = &mut *state;
        let indexes = oracles.register(address.clone(), fee, index_source.as_mut())?;
        *treasury += fee;
        Ok(indexes)
    }

    /// The caller's assigned indexes, as handed out at registration.
    pub async fn oracle_indexes(&self, address: &Address) -> Result<[u8; 3]> {
        self.state.read().await.oracles.indexes_of(address)
    }

    /// Accepts one oracle's attestation. On quorum, finalizes the flight
    /// status and credits every policy on the flight in the same atomic
    /// operation.
    pub async fn submit_oracle_response(
        &self,
        oracle: &Address,
        index: u8,
        flight: &FlightKey,
        status: FlightStatus,
    ) -> Result<ResponseOutcome> {
        let mut pending = Vec::new();

        let outcome = {
            let mut state = self.state.write().await;
            Self::ensure_operational(&state)?;
            let State {
                oracles,
                requests,
                flights,
                insurance,
                ..
            } = &mut *state;

            let registration = oracles
                .get(oracle)
                .ok_or_else(|| SuretyError::UnknownOracle(oracle.clone()))?;
            let outcome = requests.submit(registration, index, flight, status)?;

            match outcome {
                ResponseOutcome::Accepted { matching } => {
                    pending.push(CoreEvent::OracleReport {
                        flight: flight.clone(),
                        status,
                        matching,
                    });
                }
                ResponseOutcome::Quorum { status } => match flights.set_status(flight, status) {
                    Ok(_) => {
                        pending.push(CoreEvent::FlightStatusFinalized {
                            flight: flight.clone(),
                            status,
                        });
                        for (passenger, amount) in insurance.on_flight_finalized(flight, status) {
                            pending.push(CoreEvent::PolicyCredited {
                                passenger,
                                flight: flight.clone(),
                                amount,
                            });
                        }
                    }
                    // A parallel request already finalized this flight, or
                    // the request was opened for a flight that was never
                    // registered. The quorum result stands; nothing to
                    // credit.
                    Err(e) => warn!("Quorum for flight {} not applied: {}", flight, e),
                },
            }
            outcome
        };

        for event in pending {
            self.emit(event);
        }
        Ok(outcome)
    }

    // ---- insurance ----

    /// Sells the calling passenger a policy on `flight`.
    pub async fn buy_insurance(
        &self,
        passenger: &Address,
        flight: &FlightKey,
        premium: u64,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        Self::ensure_operational(&state)?;
        if !state.flights.exists(flight) {
            return Err(SuretyError::UnknownFlight(flight.to_string()));
        }
        state
            .insurance
            .buy(passenger.clone(), flight.clone(), premium)?;
        state.treasury += premium;
        Ok(())
    }

    pub async fn policy(&self, passenger: &Address, flight: &FlightKey) -> Option<InsurancePolicy> {
        self.state
            .read()
            .await
            .insurance
            .policy(passenger, flight)
            .cloned()
    }

    pub async fn credits(&self, passenger: &Address) -> u64 {
        self.state.read().await.insurance.credits(passenger)
    }

    /// Pulls `amount` of credited funds out of the ledger. The credit is
    /// drained before the amount is handed back for the outbound transfer.
    pub async fn withdraw(&self, passenger: &Address, amount: u64) -> Result<u64> {
        let mut state = self.state.write().await;
        Self::ensure_operational(&state)?;
        let paid = state.insurance.withdraw(passenger, amount)?;
        state.treasury = match state.treasury.checked_sub(paid) {
            Some(rest) => rest,
            None => {
                // Credits are backed by stakes and premiums, so this only
                // fires if bookkeeping drifted.
                warn!("Treasury underflow on withdrawal of {}", paid);
                0
            }
        };
        Ok(paid)
    }

    // ---- inspection ----

    /// JSON view of the externally observable state.
    pub async fn snapshot(&self) -> serde_json::Value {
        self.state.read().await.snapshot()
    }
}
