use crate::demo::{run_demo, run_score, DemoArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use swap_engine::error::AppError;
use swap_engine::workflows::swap::ScoringAlgorithm;

#[derive(Parser, Debug)]
#[command(
    name = "Swap Proposal Engine",
    about = "Score, submit, and track item swap proposals from the command line or over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a candidate proposal without opening a session
    Score(ScoreArgs),
    /// Walk one proposal through scoring, submission, and a scripted counterparty decision
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the configured scoring algorithm (variety | ratio)
    #[arg(long, value_parser = parse_algorithm)]
    pub(crate) algorithm: Option<ScoringAlgorithm>,
    /// Item catalog CSV (defaults to the bundled sample catalog)
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
}

pub(crate) fn parse_algorithm(raw: &str) -> Result<ScoringAlgorithm, String> {
    ScoringAlgorithm::parse(raw)
        .ok_or_else(|| format!("unknown scoring algorithm '{raw}' (expected variety or ratio)"))
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Demo(args) => run_demo(args).await,
    }
}
