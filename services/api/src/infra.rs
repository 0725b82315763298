use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use swap_engine::config::ProposalConfig;
use swap_engine::error::AppError;
use swap_engine::workflows::catalog::ItemCatalog;
use swap_engine::workflows::swap::{
    CounterpartyChannel, DispatchError, ProposalId, ProposalSnapshot, ResponseSender,
    ResponseTicket, SessionId, SessionStore, StoreError, SwapSession,
};

const SAMPLE_CATALOG: &str = include_str!("../data/sample_catalog.csv");

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) catalog: Arc<ItemCatalog>,
    pub(crate) relay: Arc<RelayCounterparty>,
    pub(crate) proposal: ProposalConfig,
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySessionStore {
    sessions: Arc<Mutex<HashMap<SessionId, SwapSession>>>,
}

impl SessionStore for InMemorySessionStore {
    fn insert(&self, session: SwapSession) -> Result<SwapSession, StoreError> {
        let mut guard = self.sessions.lock().expect("session store mutex poisoned");
        if guard.contains_key(session.id()) {
            return Err(StoreError::Conflict);
        }
        guard.insert(session.id().clone(), session.clone());
        Ok(session)
    }

    fn update(&self, session: SwapSession) -> Result<(), StoreError> {
        let mut guard = self.sessions.lock().expect("session store mutex poisoned");
        if guard.contains_key(session.id()) {
            guard.insert(session.id().clone(), session);
            Ok(())
        } else {
            Err(StoreError::NotFound)
        }
    }

    fn fetch(&self, id: &SessionId) -> Result<Option<SwapSession>, StoreError> {
        let guard = self.sessions.lock().expect("session store mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn remove(&self, id: &SessionId) -> Result<Option<SwapSession>, StoreError> {
        let mut guard = self.sessions.lock().expect("session store mutex poisoned");
        Ok(guard.remove(id))
    }
}

/// Holds the response sender of each delivered proposal until the counterparty answers
/// or the proposal is withdrawn.
#[derive(Default, Clone)]
pub(crate) struct RelayCounterparty {
    waiting: Arc<Mutex<HashMap<ProposalId, ResponseSender>>>,
}

impl CounterpartyChannel for RelayCounterparty {
    fn deliver(&self, snapshot: &ProposalSnapshot) -> Result<ResponseTicket, DispatchError> {
        let (ticket, sender) = ResponseTicket::channel(snapshot.proposal_id.clone());
        self.waiting
            .lock()
            .expect("relay mutex poisoned")
            .insert(snapshot.proposal_id.clone(), sender);
        Ok(ticket)
    }

    fn withdraw(&self, proposal_id: &ProposalId) {
        // dropping the sender wakes the response waiter with a closed channel
        self.take(proposal_id);
    }
}

impl RelayCounterparty {
    /// Removes the sender for `proposal_id`; each proposal can be answered once.
    pub(crate) fn take(&self, proposal_id: &ProposalId) -> Option<ResponseSender> {
        self.waiting
            .lock()
            .expect("relay mutex poisoned")
            .remove(proposal_id)
    }

    #[cfg(test)]
    pub(crate) fn waiting(&self) -> usize {
        self.waiting.lock().expect("relay mutex poisoned").len()
    }
}

/// Loads `path`, or the bundled sample catalog when none is given.
pub(crate) fn load_catalog(path: Option<PathBuf>) -> Result<ItemCatalog, AppError> {
    let catalog = match path {
        Some(path) => ItemCatalog::from_path(path)?,
        None => ItemCatalog::from_reader(Cursor::new(SAMPLE_CATALOG.as_bytes()))?,
    };
    Ok(catalog)
}
