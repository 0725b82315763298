use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use super::banner::ProposalBanner;
use super::counterparty::CounterpartyChannel;
use super::domain::{ItemId, SessionId, Zone};
use super::lifecycle::{LifecycleAction, LifecycleError};
use super::service::{SwapProposalService, SwapServiceError};
use super::session::SwapSession;
use super::store::{SessionStore, StoreError};

/// Router builder exposing the swap proposal workflow over JSON.
pub fn swap_router<S, C>(service: Arc<SwapProposalService<S, C>>) -> Router
where
    S: SessionStore + 'static,
    C: CounterpartyChannel + 'static,
{
    Router::new()
        .route("/api/v1/swaps", post(open_handler::<S, C>))
        .route(
            "/api/v1/swaps/:session_id",
            get(view_handler::<S, C>).delete(close_handler::<S, C>),
        )
        .route(
            "/api/v1/swaps/:session_id/draft",
            get(draft_handler::<S, C>),
        )
        .route(
            "/api/v1/swaps/:session_id/zones/:zone",
            post(add_item_handler::<S, C>),
        )
        .route(
            "/api/v1/swaps/:session_id/zones/:zone/:item_id",
            delete(remove_item_handler::<S, C>),
        )
        .route(
            "/api/v1/swaps/:session_id/reset",
            post(reset_handler::<S, C>),
        )
        .route(
            "/api/v1/swaps/:session_id/actions/:action",
            post(action_handler::<S, C>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub item_id: ItemId,
}

pub(crate) async fn open_handler<S, C>(
    State(service): State<Arc<SwapProposalService<S, C>>>,
) -> Response
where
    S: SessionStore + 'static,
    C: CounterpartyChannel + 'static,
{
    match service.open() {
        Ok(session) => (StatusCode::CREATED, axum::Json(session.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn view_handler<S, C>(
    State(service): State<Arc<SwapProposalService<S, C>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    C: CounterpartyChannel + 'static,
{
    session_response(service.get(&SessionId(session_id)), StatusCode::OK)
}

pub(crate) async fn close_handler<S, C>(
    State(service): State<Arc<SwapProposalService<S, C>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    C: CounterpartyChannel + 'static,
{
    match service.close(&SessionId(session_id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn draft_handler<S, C>(
    State(service): State<Arc<SwapProposalService<S, C>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    C: CounterpartyChannel + 'static,
{
    match service.get(&SessionId(session_id)) {
        Ok(session) => (StatusCode::OK, axum::Json(session.draft())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn add_item_handler<S, C>(
    State(service): State<Arc<SwapProposalService<S, C>>>,
    Path((session_id, zone)): Path<(String, Zone)>,
    axum::Json(request): axum::Json<AddItemRequest>,
) -> Response
where
    S: SessionStore + 'static,
    C: CounterpartyChannel + 'static,
{
    session_response(
        service.add_item(&SessionId(session_id), zone, &request.item_id),
        StatusCode::OK,
    )
}

pub(crate) async fn remove_item_handler<S, C>(
    State(service): State<Arc<SwapProposalService<S, C>>>,
    Path((session_id, zone, item_id)): Path<(String, Zone, String)>,
) -> Response
where
    S: SessionStore + 'static,
    C: CounterpartyChannel + 'static,
{
    session_response(
        service.remove_item(&SessionId(session_id), zone, &ItemId(item_id)),
        StatusCode::OK,
    )
}

pub(crate) async fn reset_handler<S, C>(
    State(service): State<Arc<SwapProposalService<S, C>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionStore + 'static,
    C: CounterpartyChannel + 'static,
{
    session_response(service.reset(&SessionId(session_id)), StatusCode::OK)
}

pub(crate) async fn action_handler<S, C>(
    State(service): State<Arc<SwapProposalService<S, C>>>,
    Path((session_id, action)): Path<(String, LifecycleAction)>,
) -> Response
where
    S: SessionStore + 'static,
    C: CounterpartyChannel + 'static,
{
    let session_id = SessionId(session_id);
    match action {
        LifecycleAction::Submit => submit(service, session_id),
        LifecycleAction::Acknowledge => {
            session_response(service.acknowledge(&session_id), StatusCode::OK)
        }
        LifecycleAction::Modify => session_response(service.modify(&session_id), StatusCode::OK),
        LifecycleAction::Cancel => session_response(service.cancel(&session_id), StatusCode::OK),
        LifecycleAction::Dismiss => {
            session_response(service.dismiss(&session_id), StatusCode::OK)
        }
        LifecycleAction::Resolve => {
            let payload = json!({
                "error": "proposal decisions arrive from the counterparty, not this endpoint",
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
    }
}

/// Submits and leaves a background task waiting on the counterparty decision.
fn submit<S, C>(service: Arc<SwapProposalService<S, C>>, session_id: SessionId) -> Response
where
    S: SessionStore + 'static,
    C: CounterpartyChannel + 'static,
{
    let (session, ticket) = match service.submit(&session_id) {
        Ok(submitted) => submitted,
        Err(error) => return error_response(error),
    };

    let waiter = service.clone();
    tokio::spawn(async move {
        match waiter.await_response(&session_id, ticket).await {
            Ok(session) => {
                debug!(session = %session_id, status = session.status().label(), "counterparty response applied")
            }
            Err(error) => {
                warn!(session = %session_id, %error, "counterparty response not applied")
            }
        }
    });

    (StatusCode::ACCEPTED, axum::Json(session.view())).into_response()
}

fn session_response(result: Result<SwapSession, SwapServiceError>, status: StatusCode) -> Response {
    match result {
        Ok(session) => (status, axum::Json(session.view())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) fn error_response(error: SwapServiceError) -> Response {
    let (status, payload) = match &error {
        SwapServiceError::Store(StoreError::NotFound) => (
            StatusCode::NOT_FOUND,
            json!({ "error": "swap session not found" }),
        ),
        SwapServiceError::UnknownItem(item_id) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "error": error.to_string(), "item_id": item_id }),
        ),
        SwapServiceError::Lifecycle(LifecycleError::SubmissionNotAllowed(blocker)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({
                "error": error.to_string(),
                "blocker": blocker,
                "banner": ProposalBanner::warning(*blocker),
            }),
        ),
        SwapServiceError::Lifecycle(_) => (
            StatusCode::CONFLICT,
            json!({ "error": error.to_string() }),
        ),
        SwapServiceError::Store(_) | SwapServiceError::Dispatch(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": error.to_string() }),
        ),
    };
    (status, axum::Json(payload)).into_response()
}
