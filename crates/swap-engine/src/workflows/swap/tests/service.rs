use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::common::*;
use crate::workflows::swap::counterparty::{CounterpartyChannel, DispatchError, ResponseTicket};
use crate::workflows::swap::domain::{ItemId, ProposalOutcome, ProposalStatus, SessionId, Zone};
use crate::workflows::swap::lifecycle::{LifecycleAction, LifecycleError, ProposalSnapshot};
use crate::workflows::swap::scoring::ScoringAlgorithm;
use crate::workflows::swap::service::{SwapProposalService, SwapServiceError};
use crate::workflows::swap::store::{SessionStore, StoreError};

fn fill<C>(service: &SwapProposalService<MemoryStore, C>) -> SessionId
where
    C: CounterpartyChannel + 'static,
{
    let session = service.open().expect("open");
    let id = session.id().clone();
    service
        .add_item(&id, Zone::Offer, &ItemId::from("camera"))
        .expect("add offer");
    service
        .add_item(&id, Zone::Request, &ItemId::from("handbag"))
        .expect("add request");
    id
}

#[test]
fn add_item_resolves_through_the_catalog() {
    let (service, store, _) = build_service(ScoringAlgorithm::RatioWeighted);
    let id = fill(&service);

    let stored = store.fetch(&id).expect("fetch").expect("session stored");
    assert_eq!(stored.proposal().offer()[0].value, 100);
    assert_eq!(stored.score().score, 100);
}

#[test]
fn unknown_items_are_refused() {
    let (service, _, _) = build_service(ScoringAlgorithm::RatioWeighted);
    let session = service.open().expect("open");

    let error = service
        .add_item(session.id(), Zone::Offer, &ItemId::from("spaceship"))
        .expect_err("not in catalog");

    assert!(matches!(error, SwapServiceError::UnknownItem(id) if id.0 == "spaceship"));
}

#[test]
fn closed_sessions_are_gone() {
    let (service, _, _) = build_service(ScoringAlgorithm::RatioWeighted);
    let id = fill(&service);

    service.close(&id).expect("close");

    assert!(matches!(
        service.get(&id),
        Err(SwapServiceError::Store(StoreError::NotFound))
    ));
}

#[test]
fn submit_delivers_the_snapshot() {
    let (service, store, counterparty) = build_service(ScoringAlgorithm::RatioWeighted);
    let id = fill(&service);

    let (session, ticket) = service.submit(&id).expect("submit");

    let delivered = counterparty.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(&delivered[0].proposal_id, ticket.proposal_id());
    assert_eq!(session.status(), ProposalStatus::Pending);
    let stored = store.fetch(&id).expect("fetch").expect("stored");
    assert_eq!(stored.status(), ProposalStatus::Pending);
}

#[test]
fn failed_delivery_keeps_the_draft() {
    let store = Arc::new(MemoryStore::default());
    let service = SwapProposalService::new(
        store.clone(),
        Arc::new(OfflineCounterparty),
        Arc::new(catalog()),
        config(ScoringAlgorithm::RatioWeighted),
    );
    let session = service.open().expect("open");
    let id = session.id().clone();
    service
        .add_item(&id, Zone::Offer, &ItemId::from("bike"))
        .expect("add");
    service
        .add_item(&id, Zone::Request, &ItemId::from("lamp"))
        .expect("add");

    let error = service.submit(&id).expect_err("offline");

    assert!(matches!(
        error,
        SwapServiceError::Dispatch(DispatchError::Transport(_))
    ));
    let stored = store.fetch(&id).expect("fetch").expect("stored");
    assert_eq!(stored.status(), ProposalStatus::Draft);
}

#[tokio::test]
async fn await_response_applies_the_decision() {
    let (service, _, counterparty) = build_service(ScoringAlgorithm::RatioWeighted);
    let id = fill(&service);
    let (_, ticket) = service.submit(&id).expect("submit");
    let proposal_id = ticket.proposal_id().clone();

    counterparty.respond(&proposal_id, ProposalOutcome::Rejected);
    let session = service.await_response(&id, ticket).await.expect("resolved");

    assert_eq!(session.status(), ProposalStatus::Rejected);

    let modified = service.modify(&id).expect("modify");
    assert!(modified.proposal().request().is_empty());
    assert_eq!(modified.proposal().offer().len(), 1);
}

#[tokio::test]
async fn waiting_does_not_hold_the_session() {
    let (service, _, counterparty) = build_service(ScoringAlgorithm::RatioWeighted);
    let service = Arc::new(service);
    let id = fill(&service);
    let (_, ticket) = service.submit(&id).expect("submit");
    let proposal_id = ticket.proposal_id().clone();

    let waiter = {
        let service = service.clone();
        let id = id.clone();
        tokio::spawn(async move { service.await_response(&id, ticket).await })
    };

    let pending = service.get(&id).expect("get");
    assert_eq!(pending.status(), ProposalStatus::Pending);

    counterparty.respond(&proposal_id, ProposalOutcome::Accepted);
    let session = waiter.await.expect("join").expect("resolved");
    assert_eq!(session.status(), ProposalStatus::Accepted);

    let acknowledged = service.acknowledge(&id).expect("acknowledge");
    assert_eq!(acknowledged.status(), ProposalStatus::Draft);
}

#[tokio::test]
async fn dropped_sender_surfaces_as_closed_channel() {
    let (service, _, counterparty) = build_service(ScoringAlgorithm::RatioWeighted);
    let id = fill(&service);
    let (_, ticket) = service.submit(&id).expect("submit");

    counterparty.hang_up();
    let error = service
        .await_response(&id, ticket)
        .await
        .expect_err("no decision");

    assert!(matches!(
        error,
        SwapServiceError::Dispatch(DispatchError::ChannelClosed(_))
    ));
    assert_eq!(
        service.get(&id).expect("get").status(),
        ProposalStatus::Pending
    );
}

#[tokio::test]
async fn late_response_after_cancel_is_refused() {
    let (service, _, counterparty) = build_service(ScoringAlgorithm::RatioWeighted);
    let id = fill(&service);
    let (_, ticket) = service.submit(&id).expect("submit");
    let proposal_id = ticket.proposal_id().clone();

    let cancelled = service.cancel(&id).expect("cancel");
    assert!(cancelled.proposal().is_empty());

    counterparty.respond(&proposal_id, ProposalOutcome::Accepted);
    let error = service
        .await_response(&id, ticket)
        .await
        .expect_err("cancelled");

    assert!(matches!(
        error,
        SwapServiceError::Lifecycle(LifecycleError::InvalidTransition {
            action: LifecycleAction::Resolve,
            from: ProposalStatus::Draft,
        })
    ));
    assert_eq!(
        service.get(&id).expect("get").status(),
        ProposalStatus::Draft
    );
}

#[test]
fn dismiss_returns_to_draft_with_zones() {
    let (service, _, _) = build_service(ScoringAlgorithm::VarietyWeighted);
    let id = fill(&service);
    service.submit(&id).expect("submit");

    let session = service.dismiss(&id).expect("dismiss");

    assert_eq!(session.status(), ProposalStatus::Draft);
    assert!(session.proposal().both_zones_filled());
}

/// Counterparty whose transport takes a while, announcing each delivery as it starts.
struct SlowCounterparty {
    inner: MemoryCounterparty,
    delay: Duration,
    delivering: Mutex<mpsc::Sender<()>>,
}

impl CounterpartyChannel for SlowCounterparty {
    fn deliver(&self, snapshot: &ProposalSnapshot) -> Result<ResponseTicket, DispatchError> {
        let _ = self.delivering.lock().expect("lock").send(());
        thread::sleep(self.delay);
        self.inner.deliver(snapshot)
    }
}

fn slow_service() -> (
    SwapProposalService<MemoryStore, SlowCounterparty>,
    Arc<MemoryStore>,
    Arc<SlowCounterparty>,
    mpsc::Receiver<()>,
) {
    let (tx, rx) = mpsc::channel();
    let store = Arc::new(MemoryStore::default());
    let counterparty = Arc::new(SlowCounterparty {
        inner: MemoryCounterparty::default(),
        delay: Duration::from_millis(100),
        delivering: Mutex::new(tx),
    });
    let service = SwapProposalService::new(
        store.clone(),
        counterparty.clone(),
        Arc::new(catalog()),
        config(ScoringAlgorithm::RatioWeighted),
    );
    (service, store, counterparty, rx)
}

#[test]
fn concurrent_submits_deliver_once() {
    let (service, store, counterparty, _delivering) = slow_service();
    let id = fill(&service);

    let (service, id) = (&service, &id);
    let results: Vec<_> = thread::scope(|scope| {
        let handles: Vec<_> = (0..2)
            .map(|_| scope.spawn(move || service.submit(id)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("submit thread"))
            .collect()
    });

    assert_eq!(results.iter().filter(|result| result.is_ok()).count(), 1);
    assert!(results.iter().any(|result| matches!(
        result,
        Err(SwapServiceError::Lifecycle(LifecycleError::InvalidTransition {
            action: LifecycleAction::Submit,
            from: ProposalStatus::Pending,
        }))
    )));
    assert_eq!(counterparty.inner.delivered().len(), 1);
    let stored = store.fetch(id).expect("fetch").expect("stored");
    assert_eq!(
        stored.submission().map(|snapshot| &snapshot.proposal_id),
        Some(&counterparty.inner.delivered()[0].proposal_id)
    );
}

#[test]
fn item_added_during_delivery_is_kept() {
    let (service, store, _, delivering) = slow_service();
    let id = fill(&service);

    thread::scope(|scope| {
        let submit = scope.spawn(|| service.submit(&id));
        delivering.recv().expect("delivery started");
        service
            .add_item(&id, Zone::Offer, &ItemId::from("lamp"))
            .expect("add while submitting");
        submit.join().expect("submit thread").expect("submit");
    });

    let stored = store.fetch(&id).expect("fetch").expect("stored");
    assert_eq!(stored.status(), ProposalStatus::Pending);
    assert_eq!(
        stored.proposal().item_ids(Zone::Offer),
        vec![ItemId::from("camera"), ItemId::from("lamp")]
    );
    let submitted = stored.submission().expect("submission");
    assert_eq!(submitted.offer.len(), 1);
}

#[tokio::test]
async fn decision_applied_after_cancel_keeps_the_cleared_zones() {
    let (service, store, counterparty) = build_service(ScoringAlgorithm::RatioWeighted);
    let service = Arc::new(service);
    let id = fill(&service);
    let (_, ticket) = service.submit(&id).expect("submit");
    let proposal_id = ticket.proposal_id().clone();

    let waiter = {
        let service = service.clone();
        let id = id.clone();
        tokio::spawn(async move { service.await_response(&id, ticket).await })
    };
    service.cancel(&id).expect("cancel");
    counterparty.respond(&proposal_id, ProposalOutcome::Accepted);

    assert!(waiter.await.expect("join").is_err());
    let stored = store.fetch(&id).expect("fetch").expect("stored");
    assert_eq!(stored.status(), ProposalStatus::Draft);
    assert!(stored.proposal().is_empty());
}

#[test]
fn cancel_withdraws_the_pending_proposal() {
    let (service, _, counterparty) = build_service(ScoringAlgorithm::RatioWeighted);
    let id = fill(&service);
    let (_, ticket) = service.submit(&id).expect("submit");

    service.cancel(&id).expect("cancel");
    service.cancel(&id).expect("cancel again");

    assert_eq!(counterparty.withdrawn(), vec![ticket.proposal_id().clone()]);
}

#[tokio::test]
async fn resolved_proposals_are_not_withdrawn() {
    let (service, _, counterparty) = build_service(ScoringAlgorithm::RatioWeighted);
    let id = fill(&service);
    let (_, ticket) = service.submit(&id).expect("submit");
    counterparty.respond(ticket.proposal_id(), ProposalOutcome::Accepted);
    service.await_response(&id, ticket).await.expect("resolved");

    service.dismiss(&id).expect("dismiss");

    assert!(counterparty.withdrawn().is_empty());
}

#[test]
fn closing_a_pending_session_withdraws_its_proposal() {
    let (service, _, counterparty) = build_service(ScoringAlgorithm::RatioWeighted);
    let id = fill(&service);
    let (_, ticket) = service.submit(&id).expect("submit");

    service.close(&id).expect("close");

    assert_eq!(counterparty.withdrawn(), vec![ticket.proposal_id().clone()]);
    assert!(matches!(
        service.submit(&id),
        Err(SwapServiceError::Store(StoreError::NotFound))
    ));
}
