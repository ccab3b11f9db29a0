//! binshift - Relocate the media of an xmeml project into a folder tree
//! mirroring its bins.
//!
//! # Execution Flow
//!
//! 1. Parse arguments (conflicting `--delete` / `--symlink` exit before any I/O)
//! 2. Initialize logging (stderr, plus rotating files with `--log-dir`)
//! 3. Load the optional YAML settings file
//! 4. Parse the project and extract the plan on a single-threaded tokio runtime
//! 5. Create directories, then copy/move/link files
//! 6. Write `migrationInfo.json` into the target directory and print the report

use anyhow::Result;
use binshift::models::ExtractionPlan;
use binshift::services::write_ledger;
use binshift::{
    APP_NAME, ConfigManager, HierarchyExtractor, ProjectTree, ReconcileState, Reconciler,
    RelocateSettings, TransferMode, VERSION, ui,
};
use camino::Utf8PathBuf;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "binshift",
    version,
    about = "Reorganize project media into folders mirroring the project's bins"
)]
struct Cli {
    /// Exported project XML (xmeml)
    project: Utf8PathBuf,

    /// Destination root for the relocated media
    target: Utf8PathBuf,

    /// Remove each original after it was copied
    #[arg(long, conflicts_with = "symlink")]
    delete: bool,

    /// Create symbolic links instead of copying
    #[arg(long)]
    symlink: bool,

    /// YAML settings file (defaults to ./binshift.yaml when present)
    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Also write rotating log files to this directory
    #[arg(long)]
    log_dir: Option<Utf8PathBuf>,

    /// Log at debug level
    #[arg(long)]
    debug: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mode = TransferMode::from_flags(cli.delete, cli.symlink);

    let _guard = binshift::logging::setup_logging(cli.log_dir.as_deref(), APP_NAME, cli.debug)?;
    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let config_manager = match &cli.config {
        Some(path) => ConfigManager::new(path),
        None => ConfigManager::default(),
    };
    let settings = config_manager.load_settings()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run(&cli, mode, &settings)).inspect_err(|err| {
        tracing::error!("Run aborted: {:#}", err);
    })
}

async fn run(cli: &Cli, mode: TransferMode, settings: &RelocateSettings) -> Result<()> {
    let plan = extract_plan(cli, settings).await?;

    println!(
        "{} {} items from {} to {}",
        mode.verb(),
        plan.len(),
        cli.project,
        cli.target
    );

    let reconciler =
        Reconciler::new(&cli.target, mode)?.with_concurrency(settings.max_concurrent_operations);

    let state = ReconcileState::new(plan.len());
    let progress = ui::spawn_progress_bar(state.subscribe(), plan.len(), cli.quiet);

    reconciler.reconcile(&plan, &state).await?;
    state.metrics().log_summary();

    let report = state.into_report();
    if let Err(err) = progress.await {
        tracing::warn!("Progress display task failed: {}", err);
    }

    write_ledger(reconciler.target_root(), &report.relocations).await?;

    ui::print_report(&plan.skipped, &report);
    Ok(())
}

/// Parse the project and extract the plan; the tree is dropped afterwards.
async fn extract_plan(cli: &Cli, settings: &RelocateSettings) -> Result<ExtractionPlan> {
    let tree = ProjectTree::load(&cli.project).await?;
    let extractor = HierarchyExtractor::new(settings)?;
    Ok(extractor.extract(&tree)?)
}
