use crate::cli::parse_algorithm;
use crate::infra::{load_catalog, InMemorySessionStore, RelayCounterparty};
use crate::routes::{score_items, ScoreReport};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use swap_engine::config::{AppConfig, ProposalConfig};
use swap_engine::error::AppError;
use swap_engine::workflows::swap::{
    FeedbackItem, FeedbackPolarity, GateDecision, ItemId, LifecycleError, ProposalBanner,
    ProposalOutcome, ScoringAlgorithm, SessionView, SwapProposalService, SwapServiceError, Zone,
};

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Catalog id to place in the offer zone (repeatable)
    #[arg(long)]
    pub(crate) offer: Vec<String>,
    /// Catalog id to place in the request zone (repeatable)
    #[arg(long)]
    pub(crate) request: Vec<String>,
    /// Scoring algorithm (variety | ratio). Defaults to the configured algorithm.
    #[arg(long, value_parser = parse_algorithm)]
    pub(crate) algorithm: Option<ScoringAlgorithm>,
    /// Item catalog CSV (defaults to the bundled sample catalog)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Catalog ids to offer (defaults to a camera and a lamp)
    #[arg(long)]
    pub(crate) offer: Vec<String>,
    /// Catalog ids to request (defaults to a handbag)
    #[arg(long)]
    pub(crate) request: Vec<String>,
    /// Decision the scripted counterparty sends back
    #[arg(long, value_parser = parse_outcome, default_value = "accepted")]
    pub(crate) outcome: ProposalOutcome,
    /// Scoring algorithm (variety | ratio). Defaults to the configured algorithm.
    #[arg(long, value_parser = parse_algorithm)]
    pub(crate) algorithm: Option<ScoringAlgorithm>,
    /// Item catalog CSV (defaults to the bundled sample catalog)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

fn parse_outcome(raw: &str) -> Result<ProposalOutcome, String> {
    ProposalOutcome::parse(raw)
        .ok_or_else(|| format!("unknown outcome '{raw}' (expected accepted or rejected)"))
}

fn proposal_config(algorithm: Option<ScoringAlgorithm>) -> Result<ProposalConfig, AppError> {
    let mut config = AppConfig::load()?.proposal;
    if let Some(algorithm) = algorithm {
        config.scoring = algorithm;
    }
    Ok(config)
}

fn item_ids(raw: Vec<String>) -> Vec<ItemId> {
    raw.into_iter().map(ItemId).collect()
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        offer,
        request,
        algorithm,
        catalog,
        json,
    } = args;

    let config = proposal_config(algorithm)?;
    let catalog = load_catalog(catalog)?;
    let report = match score_items(&catalog, &item_ids(offer), &item_ids(request), config) {
        Ok(report) => report,
        Err(item_id) => {
            println!("Item {item_id} is not in the catalog");
            return Ok(());
        }
    };

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{json}"),
            Err(err) => println!("Score report unavailable: {err}"),
        }
        return Ok(());
    }

    render_score_report(&report);
    Ok(())
}

fn render_score_report(report: &ScoreReport) {
    println!("Compatibility ({})", report.algorithm.label());
    println!(
        "- Offer: {} items worth {} | Request: {} items worth {}",
        report.offer_summary.item_count,
        report.offer_summary.total_value,
        report.request_summary.item_count,
        report.request_summary.total_value
    );
    println!("- Score {} / 100 ({})", report.score.score, report.band_label);
    render_feedback(&report.score.feedback);
    render_gate(report.gate);
}

fn render_feedback(feedback: &[FeedbackItem]) {
    for entry in feedback {
        let marker = match entry.polarity {
            FeedbackPolarity::Positive => "+",
            FeedbackPolarity::Negative => "-",
            FeedbackPolarity::Neutral => "~",
        };
        println!("    {marker} {}", entry.text);
    }
}

fn render_gate(gate: GateDecision) {
    match gate.blocker() {
        None => println!("- Ready to submit"),
        Some(blocker) => println!("- Submission blocked: {blocker}"),
    }
}

fn render_banner(banner: Option<&ProposalBanner>) {
    if let Some(banner) = banner {
        println!("  [{}] {}", banner.title, banner.message);
        if let Some(action) = &banner.action {
            println!("  Next step: {} ({})", action.label, action.action);
        }
    }
}

fn render_view(view: &SessionView) {
    let names = |items: &[swap_engine::workflows::swap::Item]| {
        items
            .iter()
            .map(|item| item.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    println!("  Offer:   [{}]", names(&view.offer));
    println!("  Request: [{}]", names(&view.request));
    println!(
        "  Score {} / 100 ({}) | status {}",
        view.score.score, view.band_label, view.status
    );
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        offer,
        request,
        outcome,
        algorithm,
        catalog,
    } = args;

    let offer = if offer.is_empty() {
        vec!["cam-01".to_string(), "lamp-03".to_string()]
    } else {
        offer
    };
    let request = if request.is_empty() {
        vec!["bag-05".to_string()]
    } else {
        request
    };

    let config = proposal_config(algorithm)?;
    let catalog = Arc::new(load_catalog(catalog)?);
    let relay = Arc::new(RelayCounterparty::default());
    let service = SwapProposalService::new(
        Arc::new(InMemorySessionStore::default()),
        relay.clone(),
        catalog,
        config,
    );

    println!(
        "Swap proposal demo ({} scoring, submit at {}+)",
        config.scoring.label(),
        config.minimum_submit_score
    );
    let session = service.open()?;
    let session_id = session.id().clone();
    println!("- Opened {session_id}");

    for (zone, ids) in [(Zone::Offer, offer), (Zone::Request, request)] {
        for id in item_ids(ids) {
            match service.add_item(&session_id, zone, &id) {
                Ok(session) => println!(
                    "  + {} -> {} zone (score {})",
                    id,
                    zone.label(),
                    session.score().score
                ),
                Err(SwapServiceError::UnknownItem(id)) => {
                    println!("  ! {id} is not in the catalog, skipped")
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    let view = service.get(&session_id)?.view();
    println!("\nCompatibility");
    render_view(&view);
    render_feedback(&view.feedback);
    render_gate(view.gate);

    println!("\nSubmitting proposal");
    let (submitted, ticket) = match service.submit(&session_id) {
        Ok(submitted) => submitted,
        Err(SwapServiceError::Lifecycle(LifecycleError::SubmissionNotAllowed(blocker))) => {
            render_banner(Some(&ProposalBanner::warning(blocker)));
            return Ok(());
        }
        Err(err) => return Err(err.into()),
    };
    let proposal_id = ticket.proposal_id().clone();
    println!("- Sent {proposal_id}");
    render_banner(submitted.banner().as_ref());
    if let Some(snapshot) = submitted.submission() {
        match serde_json::to_string_pretty(snapshot) {
            Ok(json) => println!("  Delivered snapshot:\n{json}"),
            Err(err) => println!("  Delivered snapshot unavailable: {err}"),
        }
    }

    match relay.take(&proposal_id) {
        Some(sender) => {
            println!("- Counterparty answers: {}", outcome.status());
            sender.send(outcome).map_err(SwapServiceError::from)?;
        }
        None => println!("- Counterparty never received {proposal_id}"),
    }

    let resolved = service.await_response(&session_id, ticket).await?;
    render_banner(resolved.banner().as_ref());

    let follow_up = match outcome {
        ProposalOutcome::Accepted => service.acknowledge(&session_id)?,
        ProposalOutcome::Rejected => service.modify(&session_id)?,
    };
    println!("\nAfter {}", outcome.status());
    render_view(&follow_up.view());

    Ok(())
}
