use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::counterparty::{CounterpartyChannel, DispatchError, ResponseTicket};
use super::domain::{ItemId, ProposalId, ProposalOutcome, ProposalStatus, SessionId, Zone};
use super::lifecycle::{LifecycleError, ProposalSnapshot};
use super::session::SwapSession;
use super::store::{SessionStore, StoreError};
use crate::config::ProposalConfig;
use crate::workflows::catalog::ItemCatalog;

/// Service composing the session store, item catalog, and counterparty channel.
///
/// Every operation that changes a session holds that session's lock from fetch to
/// store update, so concurrent calls on one session apply one after another.
pub struct SwapProposalService<S, C> {
    store: Arc<S>,
    counterparty: Arc<C>,
    catalog: Arc<ItemCatalog>,
    config: ProposalConfig,
    locks: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_session_id() -> SessionId {
    let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("session-{id:06}"))
}

impl<S, C> SwapProposalService<S, C>
where
    S: SessionStore + 'static,
    C: CounterpartyChannel + 'static,
{
    pub fn new(
        store: Arc<S>,
        counterparty: Arc<C>,
        catalog: Arc<ItemCatalog>,
        config: ProposalConfig,
    ) -> Self {
        Self {
            store,
            counterparty,
            catalog,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> ProposalConfig {
        self.config
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }

    /// Start an empty session scored with the configured algorithm.
    pub fn open(&self) -> Result<SwapSession, SwapServiceError> {
        let session = SwapSession::new(next_session_id(), self.config);
        let stored = self.store.insert(session)?;
        self.locks
            .lock()
            .expect("session lock table poisoned")
            .insert(stored.id().clone(), Arc::default());
        debug!(session = %stored.id(), algorithm = stored.algorithm().label(), "swap session opened");
        Ok(stored)
    }

    pub fn get(&self, session_id: &SessionId) -> Result<SwapSession, SwapServiceError> {
        let session = self
            .store
            .fetch(session_id)?
            .ok_or(StoreError::NotFound)?;
        Ok(session)
    }

    /// Remove the session. A proposal still awaiting a decision is withdrawn.
    pub fn close(&self, session_id: &SessionId) -> Result<SwapSession, SwapServiceError> {
        let lock = self.session_lock(session_id)?;
        let _guard = lock.lock().expect("session lock poisoned");
        let session = self
            .store
            .remove(session_id)?
            .ok_or(StoreError::NotFound)?;
        self.locks
            .lock()
            .expect("session lock table poisoned")
            .remove(session_id);
        if session.status() == ProposalStatus::Pending {
            if let Some(snapshot) = session.submission() {
                self.withdraw(session_id, snapshot);
            }
        }
        Ok(session)
    }

    /// Place a catalog item into a zone. Re-adding an item already in the zone is a no-op.
    pub fn add_item(
        &self,
        session_id: &SessionId,
        zone: Zone,
        item_id: &ItemId,
    ) -> Result<SwapSession, SwapServiceError> {
        let item = self
            .catalog
            .get(item_id)
            .cloned()
            .ok_or_else(|| SwapServiceError::UnknownItem(item_id.clone()))?;
        self.mutate(session_id, |session| {
            session.add(zone, item);
            Ok(())
        })
        .map(|(session, _)| session)
    }

    pub fn remove_item(
        &self,
        session_id: &SessionId,
        zone: Zone,
        item_id: &ItemId,
    ) -> Result<SwapSession, SwapServiceError> {
        self.mutate(session_id, |session| {
            session.remove(zone, item_id);
            Ok(())
        })
        .map(|(session, _)| session)
    }

    pub fn reset(&self, session_id: &SessionId) -> Result<SwapSession, SwapServiceError> {
        self.mutate(session_id, |session| {
            session.reset();
            Ok(())
        })
        .map(|(session, _)| session)
    }

    /// Submit the current zones and hand the snapshot to the counterparty.
    ///
    /// Delivery happens under the session lock, so at most one submission per draft
    /// reaches the counterparty. If delivery fails the session stays in draft.
    pub fn submit(
        &self,
        session_id: &SessionId,
    ) -> Result<(SwapSession, ResponseTicket), SwapServiceError> {
        self.mutate(session_id, |session| {
            let snapshot = session.submit()?;
            let ticket = self.counterparty.deliver(&snapshot)?;
            Ok(ticket)
        })
    }

    /// Apply a counterparty decision to the session's pending proposal.
    pub fn resolve(
        &self,
        session_id: &SessionId,
        proposal_id: &ProposalId,
        outcome: ProposalOutcome,
    ) -> Result<SwapSession, SwapServiceError> {
        let result = self.mutate(session_id, |session| {
            Ok(session.resolve(proposal_id, outcome)?)
        });
        if let Err(SwapServiceError::Lifecycle(LifecycleError::StaleResponse { .. })) = &result {
            warn!(session = %session_id, proposal = %proposal_id, "ignoring response for a superseded proposal");
        }
        result.map(|(session, _)| session)
    }

    /// Wait for the ticket's decision, then resolve. The session is not locked while waiting.
    pub async fn await_response(
        &self,
        session_id: &SessionId,
        ticket: ResponseTicket,
    ) -> Result<SwapSession, SwapServiceError> {
        let proposal_id = ticket.proposal_id().clone();
        let outcome = ticket.outcome().await?;
        self.resolve(session_id, &proposal_id, outcome)
    }

    pub fn acknowledge(&self, session_id: &SessionId) -> Result<SwapSession, SwapServiceError> {
        self.mutate(session_id, |session| Ok(session.acknowledge()?))
            .map(|(session, _)| session)
    }

    pub fn modify(&self, session_id: &SessionId) -> Result<SwapSession, SwapServiceError> {
        self.mutate(session_id, |session| Ok(session.modify()?))
            .map(|(session, _)| session)
    }

    pub fn cancel(&self, session_id: &SessionId) -> Result<SwapSession, SwapServiceError> {
        let (session, withdrawn) = self.mutate(session_id, |session| {
            let pending = session.status() == ProposalStatus::Pending;
            Ok(session.cancel().filter(|_| pending))
        })?;
        if let Some(snapshot) = withdrawn {
            self.withdraw(session_id, &snapshot);
        }
        Ok(session)
    }

    pub fn dismiss(&self, session_id: &SessionId) -> Result<SwapSession, SwapServiceError> {
        let (session, withdrawn) = self.mutate(session_id, |session| {
            let pending = session.status() == ProposalStatus::Pending;
            Ok(session.dismiss().filter(|_| pending))
        })?;
        if let Some(snapshot) = withdrawn {
            self.withdraw(session_id, &snapshot);
        }
        Ok(session)
    }

    fn withdraw(&self, session_id: &SessionId, snapshot: &ProposalSnapshot) {
        self.counterparty.withdraw(&snapshot.proposal_id);
        debug!(session = %session_id, proposal = %snapshot.proposal_id, "pending proposal withdrawn");
    }

    /// Fetch, change and store one session while holding its lock.
    fn mutate<T>(
        &self,
        session_id: &SessionId,
        apply: impl FnOnce(&mut SwapSession) -> Result<T, SwapServiceError>,
    ) -> Result<(SwapSession, T), SwapServiceError> {
        let lock = self.session_lock(session_id)?;
        let _guard = lock.lock().expect("session lock poisoned");
        let mut session = self.get(session_id)?;
        let value = apply(&mut session)?;
        self.store.update(session.clone())?;
        Ok((session, value))
    }

    fn session_lock(&self, session_id: &SessionId) -> Result<Arc<Mutex<()>>, SwapServiceError> {
        let mut locks = self.locks.lock().expect("session lock table poisoned");
        if let Some(lock) = locks.get(session_id) {
            return Ok(lock.clone());
        }
        // sessions inserted into the store directly get a lock on first use
        self.get(session_id)?;
        Ok(locks.entry(session_id.clone()).or_default().clone())
    }
}

/// Error raised by the swap proposal service.
#[derive(Debug, thiserror::Error)]
pub enum SwapServiceError {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("item {0} is not in the catalog")]
    UnknownItem(ItemId),
}
