use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::config::ProposalConfig;
use crate::workflows::catalog::ItemCatalog;
use crate::workflows::swap::counterparty::{
    CounterpartyChannel, DispatchError, ResponseSender, ResponseTicket,
};
use crate::workflows::swap::domain::{
    Item, ItemId, OwnerId, ProposalId, ProposalOutcome, SessionId,
};
use crate::workflows::swap::lifecycle::ProposalSnapshot;
use crate::workflows::swap::scoring::ScoringAlgorithm;
use crate::workflows::swap::session::SwapSession;
use crate::workflows::swap::store::{SessionStore, StoreError};
use crate::workflows::swap::SwapProposalService;

pub(super) fn item(id: &str, value: u32) -> Item {
    Item {
        id: ItemId::from(id),
        name: format!("Item {id}"),
        description: String::new(),
        value,
        owner_id: OwnerId("alex".to_string()),
    }
}

pub(super) fn catalog() -> ItemCatalog {
    ItemCatalog::from_items(vec![
        item("camera", 100),
        item("bike", 100),
        item("handbag", 100),
        item("lamp", 100),
        item("guitar", 900),
        item("mug", 5),
    ])
    .expect("fixture catalog is unique")
}

pub(super) fn config(algorithm: ScoringAlgorithm) -> ProposalConfig {
    ProposalConfig {
        scoring: algorithm,
        minimum_submit_score: 40,
    }
}

pub(super) fn session(algorithm: ScoringAlgorithm) -> SwapSession {
    SwapSession::new(SessionId("session-test".to_string()), config(algorithm))
}

/// Session holding one 100-value item on each side, ready to submit.
pub(super) fn ready_session() -> SwapSession {
    let mut session = session(ScoringAlgorithm::VarietyWeighted);
    session.add_to_offer(item("camera", 100));
    session.add_to_request(item("handbag", 100));
    session
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    sessions: Arc<Mutex<HashMap<SessionId, SwapSession>>>,
}

impl SessionStore for MemoryStore {
    fn insert(&self, session: SwapSession) -> Result<SwapSession, StoreError> {
        let mut guard = self.sessions.lock().expect("lock");
        if guard.contains_key(session.id()) {
            return Err(StoreError::Conflict);
        }
        guard.insert(session.id().clone(), session.clone());
        Ok(session)
    }

    fn update(&self, session: SwapSession) -> Result<(), StoreError> {
        let mut guard = self.sessions.lock().expect("lock");
        guard.insert(session.id().clone(), session);
        Ok(())
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<SwapSession>, StoreError> {
        let guard = self.sessions.lock().expect("lock");
        Ok(guard.get(id).cloned())
    }

    fn remove(&self, id: &SessionId) -> Result<Option<SwapSession>, StoreError> {
        let mut guard = self.sessions.lock().expect("lock");
        Ok(guard.remove(id))
    }
}

pub(super) struct UnavailableStore;

impl SessionStore for UnavailableStore {
    fn insert(&self, _session: SwapSession) -> Result<SwapSession, StoreError> {
        Err(StoreError::Unavailable("maintenance".to_string()))
    }

    fn update(&self, _session: SwapSession) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("maintenance".to_string()))
    }

    fn fetch(&self, _id: &SessionId) -> Result<Option<SwapSession>, StoreError> {
        Err(StoreError::Unavailable("maintenance".to_string()))
    }

    fn remove(&self, _id: &SessionId) -> Result<Option<SwapSession>, StoreError> {
        Err(StoreError::Unavailable("maintenance".to_string()))
    }
}

/// Records deliveries and keeps each response sender until the test answers it.
#[derive(Default, Clone)]
pub(super) struct MemoryCounterparty {
    delivered: Arc<Mutex<Vec<ProposalSnapshot>>>,
    senders: Arc<Mutex<Vec<ResponseSender>>>,
    withdrawn: Arc<Mutex<Vec<ProposalId>>>,
}

impl MemoryCounterparty {
    pub(super) fn delivered(&self) -> Vec<ProposalSnapshot> {
        self.delivered.lock().expect("lock").clone()
    }

    pub(super) fn withdrawn(&self) -> Vec<ProposalId> {
        self.withdrawn.lock().expect("lock").clone()
    }

    pub(super) fn respond(&self, proposal_id: &ProposalId, outcome: ProposalOutcome) {
        let mut guard = self.senders.lock().expect("lock");
        let position = guard
            .iter()
            .position(|sender| sender.proposal_id() == proposal_id)
            .expect("proposal was delivered");
        let sender = guard.remove(position);
        sender.send(outcome).expect("ticket still waiting");
    }

    pub(super) fn hang_up(&self) {
        self.senders.lock().expect("lock").clear();
    }
}

impl CounterpartyChannel for MemoryCounterparty {
    fn deliver(&self, snapshot: &ProposalSnapshot) -> Result<ResponseTicket, DispatchError> {
        let (ticket, sender) = ResponseTicket::channel(snapshot.proposal_id.clone());
        self.delivered.lock().expect("lock").push(snapshot.clone());
        self.senders.lock().expect("lock").push(sender);
        Ok(ticket)
    }

    fn withdraw(&self, proposal_id: &ProposalId) {
        // senders stay so tests can still answer a withdrawn proposal
        self.withdrawn.lock().expect("lock").push(proposal_id.clone());
    }
}

pub(super) struct OfflineCounterparty;

impl CounterpartyChannel for OfflineCounterparty {
    fn deliver(&self, _snapshot: &ProposalSnapshot) -> Result<ResponseTicket, DispatchError> {
        Err(DispatchError::Transport("counterparty offline".to_string()))
    }
}

pub(super) type TestService = SwapProposalService<MemoryStore, MemoryCounterparty>;

pub(super) fn build_service(
    algorithm: ScoringAlgorithm,
) -> (TestService, Arc<MemoryStore>, Arc<MemoryCounterparty>) {
    let store = Arc::new(MemoryStore::default());
    let counterparty = Arc::new(MemoryCounterparty::default());
    let service = SwapProposalService::new(
        store.clone(),
        counterparty.clone(),
        Arc::new(catalog()),
        config(algorithm),
    );
    (service, store, counterparty)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
