use crate::cli::ServeArgs;
use crate::infra::{load_catalog, AppState, InMemorySessionStore, RelayCounterparty};
use crate::routes::with_swap_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use swap_engine::config::AppConfig;
use swap_engine::error::AppError;
use swap_engine::telemetry;
use swap_engine::workflows::swap::SwapProposalService;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(algorithm) = args.algorithm.take() {
        config.proposal.scoring = algorithm;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = Arc::new(load_catalog(args.catalog.take())?);
    info!(items = catalog.len(), "item catalog loaded");

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let relay = Arc::new(RelayCounterparty::default());
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        catalog: catalog.clone(),
        relay: relay.clone(),
        proposal: config.proposal,
    };

    let store = Arc::new(InMemorySessionStore::default());
    let swap_service = Arc::new(SwapProposalService::new(
        store,
        relay,
        catalog,
        config.proposal,
    ));

    let app = with_swap_routes(swap_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        algorithm = config.proposal.scoring.label(),
        minimum_submit_score = config.proposal.minimum_submit_score,
        "swap proposal engine ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
