use crate::infra::{AppState, RelayCounterparty};
use axum::extract::{Path, Query};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use swap_engine::config::ProposalConfig;
use swap_engine::workflows::catalog::ItemCatalog;
use swap_engine::workflows::swap::{
    swap_router, CompatibilityScorer, GateDecision, Item, ItemId, OwnerId, ProposalId,
    ProposalOutcome, ProposalSet, ScoreBand, ScoreResult, ScoringAlgorithm, SessionStore,
    SubmissionGate, SwapProposalService, Zone, ZoneSummary,
};
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreRequest {
    pub(crate) offer: Vec<ItemId>,
    pub(crate) request: Vec<ItemId>,
    #[serde(default)]
    pub(crate) algorithm: Option<ScoringAlgorithm>,
}

/// Stateless evaluation of a candidate proposal, shared by the HTTP and CLI surfaces.
#[derive(Debug, Serialize)]
pub(crate) struct ScoreReport {
    pub(crate) algorithm: ScoringAlgorithm,
    pub(crate) offer_summary: ZoneSummary,
    pub(crate) request_summary: ZoneSummary,
    pub(crate) score: ScoreResult,
    pub(crate) band: ScoreBand,
    pub(crate) band_label: &'static str,
    pub(crate) gate: GateDecision,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogQuery {
    #[serde(default)]
    pub(crate) owner: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CounterpartyResponse {
    pub(crate) outcome: ProposalOutcome,
}

pub(crate) fn with_swap_routes<S>(
    service: Arc<SwapProposalService<S, RelayCounterparty>>,
) -> axum::Router
where
    S: SessionStore + 'static,
{
    swap_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/catalog", axum::routing::get(catalog_endpoint))
        .route("/api/v1/score", axum::routing::post(score_endpoint))
        .route(
            "/api/v1/counterparty/:proposal_id/response",
            axum::routing::post(counterparty_response_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn catalog_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Json<Vec<Item>> {
    let items = match query.owner {
        Some(owner) => state
            .catalog
            .owned_by(&OwnerId(owner))
            .into_iter()
            .cloned()
            .collect(),
        None => state.catalog.items().to_vec(),
    };
    Json(items)
}

pub(crate) async fn score_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<ScoreRequest>,
) -> Response {
    let mut config = state.proposal;
    if let Some(algorithm) = payload.algorithm {
        config.scoring = algorithm;
    }

    match score_items(&state.catalog, &payload.offer, &payload.request, config) {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(item_id) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "error": format!("item {item_id} is not in the catalog"),
                "item_id": item_id,
            })),
        )
            .into_response(),
    }
}

pub(crate) async fn counterparty_response_endpoint(
    Extension(state): Extension<AppState>,
    Path(proposal_id): Path<String>,
    Json(payload): Json<CounterpartyResponse>,
) -> Response {
    let proposal_id = ProposalId(proposal_id);
    let Some(sender) = state.relay.take(&proposal_id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no proposal {proposal_id} is awaiting a response") })),
        )
            .into_response();
    };

    match sender.send(payload.outcome) {
        Ok(()) => {
            info!(proposal = %proposal_id, outcome = ?payload.outcome, "counterparty response relayed");
            (
                StatusCode::ACCEPTED,
                Json(json!({ "proposal_id": proposal_id, "outcome": payload.outcome })),
            )
                .into_response()
        }
        Err(error) => {
            warn!(proposal = %proposal_id, %error, "counterparty response dropped");
            (StatusCode::GONE, Json(json!({ "error": error.to_string() }))).into_response()
        }
    }
}

/// Builds a throwaway proposal from catalog ids and scores it. Returns the first unknown id.
pub(crate) fn score_items(
    catalog: &ItemCatalog,
    offer: &[ItemId],
    request: &[ItemId],
    config: ProposalConfig,
) -> Result<ScoreReport, ItemId> {
    let mut proposal = ProposalSet::new();
    for (zone, ids) in [(Zone::Offer, offer), (Zone::Request, request)] {
        for id in ids {
            let item = catalog.get(id).cloned().ok_or_else(|| id.clone())?;
            proposal.add(zone, item);
        }
    }

    let score = CompatibilityScorer::new(config.scoring).score(&proposal);
    let gate = SubmissionGate::new(config.minimum_submit_score).evaluate(&proposal, &score);
    let band = score.band();
    Ok(ScoreReport {
        algorithm: config.scoring,
        offer_summary: proposal.summary(Zone::Offer),
        request_summary: proposal.summary(Zone::Request),
        score,
        band,
        band_label: band.label(),
        gate,
    })
}
