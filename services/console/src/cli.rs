use crate::commands::{run_deadlines, run_draft, run_report, DeadlinesArgs, DraftArgs, ReportArgs};
use crate::demo::{run_demo, DemoArgs};
use crate::error::AppError;
use clap::{Parser, Subcommand};
use housing_compliance::config::EngineConfig;
use housing_compliance::telemetry;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "Housing Compliance Console",
    about = "Deadlines, scoped caseload reports and letter drafts for housing teams",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scoped KPIs, findings, deadline statuses and escalations for one persona
    Report(ReportArgs),
    /// Statutory milestones for a case, or a single ad hoc deadline
    Deadlines(DeadlinesArgs),
    /// Render a letter for one entity
    Draft(DraftArgs),
    /// Walk through the engine on a built-in sample portfolio
    Demo(DemoArgs),
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    let config = EngineConfig::load()?;
    telemetry::init(&config.telemetry)?;
    let tables = config.tables()?;
    info!(environment = ?config.environment, "housing compliance console ready");

    match cli.command {
        Command::Report(args) => run_report(args, &tables),
        Command::Deadlines(args) => run_deadlines(args, &tables),
        Command::Draft(args) => run_draft(args, &tables),
        Command::Demo(args) => run_demo(args, &tables),
    }
}
