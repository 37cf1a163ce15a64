use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use yearfixer_core::{about, Config, DbLibrary, RunSummary, YearFixerCommand};
use yearfixer_db::DatabaseConfig;
use yearfixer_migration::{Migrator, MigratorTrait};

#[derive(Parser, Debug)]
#[command(name = "yearfixer", about = about::SHORT_DESCRIPTION, disable_version_flag = true)]
struct Cli {
    /// Library query, e.g. `artist:beatles year:0 album+`
    query: Vec<String>,

    /// Recompute years for every matched item, not only incomplete ones
    #[arg(short, long)]
    force: bool,

    /// Print version information and exit
    #[arg(short = 'v', long = "version")]
    version: bool,

    /// TOML configuration file
    #[arg(long, env = "YEARFIXER_CONFIG")]
    config: Option<PathBuf>,

    /// Update the library only, leave audio files alone
    #[arg(long)]
    no_write: bool,

    /// Library database URL (overrides DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,

    /// Debug logging
    #[arg(long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn print_summary(summary: &RunSummary) {
    println!(
        "{} item(s) selected: {} updated, {} unchanged, {} already complete, {} unresolved, {} failed",
        summary.selected,
        summary.updated,
        summary.unchanged,
        summary.already_complete,
        summary.unresolved,
        summary.failed
    );
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if cli.version {
        println!("{}", about::version_info());
        return Ok(());
    }

    init_tracing(cli.verbose);

    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if cli.force {
        config.force = true;
    }
    if cli.no_write {
        config.write = false;
    }

    let mut db_config = DatabaseConfig::from_env();
    if let Some(url) = cli.database_url {
        db_config.url = url;
    }

    tracing::info!("connecting to library database...");
    let db = yearfixer_db::connect(&db_config)
        .await
        .with_context(|| format!("failed to connect to {}", db_config.url))?;
    Migrator::up(&db, None)
        .await
        .context("failed to run migrations")?;

    let library = DbLibrary::new(db);
    let command = YearFixerCommand::new(&library, &config)?;
    let summary = command.run(&cli.query).await?;
    print_summary(&summary);
    Ok(())
}
