//! Move review CLI
//!
//! Score unprocessed games with a UCI engine and record throws and missed
//! opportunities.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use move_review::{PipelineRunner, ReviewConfig, SqliteStore};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info, warn};
use uci_engine::{StopSignal, UciLauncher};

#[derive(Parser, Debug)]
#[command(name = "move_review")]
#[command(about = "Incremental engine review of played chess games")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "MOVE_REVIEW_CONFIG")]
    config: Option<PathBuf>,

    /// Database URL, e.g. sqlite://games.db
    #[arg(long, env = "MOVE_REVIEW_DATABASE")]
    database: Option<String>,

    /// UCI engine executable
    #[arg(long, env = "STOCKFISH_PATH")]
    engine: Option<PathBuf>,

    /// Games selected per run
    #[arg(long)]
    batch_size: Option<u32>,

    /// Engine processes running at the same time
    #[arg(long)]
    concurrency: Option<usize>,

    /// Save the run report as JSON
    #[arg(long)]
    report: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Evaluate and classify one batch of unprocessed games
    Run,
    /// Keep running batches until interrupted
    Watch {
        /// Pause between runs in seconds
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Extract clock readings for unprocessed games
    Clocks,
    /// Recompute the events of a stored game from its stored scores
    Reclassify {
        #[arg(long)]
        game_id: String,
    },
}

fn load_config(args: &Args) -> Result<ReviewConfig> {
    let mut config = match &args.config {
        Some(path) => ReviewConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ReviewConfig::default(),
    };

    if let Some(url) = &args.database {
        config.store.database_url = url.clone();
    }
    if let Some(engine) = &args.engine {
        config.engine.path = engine.clone();
    }
    if let Some(batch_size) = args.batch_size {
        config.pipeline.batch_size = batch_size;
    }
    if let Some(concurrency) = args.concurrency {
        config.pipeline.concurrency = concurrency;
    }
    if let Command::Watch {
        interval: Some(secs),
    } = args.command
    {
        config.pipeline.watch_interval_secs = secs;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    info!(
        "Starting move review v{} (engine {})",
        env!("CARGO_PKG_VERSION"),
        config.engine.path.display()
    );

    let store = SqliteStore::connect(&config.store)
        .await
        .context("Failed to connect to database")?;
    store
        .ensure_source_table()
        .await
        .context("Failed to prepare games table")?;

    let stop = StopSignal::new();
    let on_interrupt = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing current games");
            on_interrupt.stop();
        }
    });

    let launcher = UciLauncher::new(config.engine_command(), config.search_limits());
    let runner = PipelineRunner::new(&config, store, launcher, stop.clone());

    match &args.command {
        Command::Run => {
            let report = runner.run_once().await.context("Run failed")?;
            report.print_report();
            if let Some(path) = &args.report {
                report
                    .save(path)
                    .with_context(|| format!("Failed to save report {}", path.display()))?;
            }
        }
        Command::Clocks => {
            let report = runner.run_clocks().await.context("Clock extraction failed")?;
            println!("{}", report.generate_report());
        }
        Command::Reclassify { game_id } => {
            let events = runner
                .reclassify(game_id)
                .await
                .with_context(|| format!("Failed to reclassify {game_id}"))?;
            println!("{} events for {}", events.len(), game_id);
            for event in &events {
                println!(
                    "  move {:>4}  {:<16} {:<20} {:<8} {}",
                    event.move_number, event.player, event.category, event.severity, event.phase
                );
            }
        }
        Command::Watch { .. } => {
            let interval = Duration::from_secs(config.pipeline.watch_interval_secs);
            watch(&runner, &stop, interval, args.report.as_deref()).await?;
        }
    }

    Ok(())
}

async fn watch(
    runner: &PipelineRunner<UciLauncher>,
    stop: &StopSignal,
    interval: Duration,
    report_path: Option<&std::path::Path>,
) -> Result<()> {
    info!(interval_secs = interval.as_secs(), "Watching for new games");
    while !stop.is_stopped() {
        let report = match runner.run_once().await {
            Ok(report) => report,
            Err(e) => {
                error!("Run failed: {}", e);
                return Err(e).context("Run failed");
            }
        };
        report.print_report();
        if let Some(path) = report_path {
            report
                .save(path)
                .with_context(|| format!("Failed to save report {}", path.display()))?;
        }
        runner.run_clocks().await.context("Clock extraction failed")?;

        let mut waited = Duration::ZERO;
        while waited < interval && !stop.is_stopped() {
            let step = Duration::from_secs(1).min(interval - waited);
            tokio::time::sleep(step).await;
            waited += step;
        }
    }
    info!("Watch stopped");
    Ok(())
}
