use anyhow::Context;
use clap::Parser;
use fii_core::reconcile::Pipeline;
use fii_core::storage::{self, WriteMode};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "fii_worker")]
struct Args {
    /// Folder with the scraper extracts. Overrides FII_DATA_DIR.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Destination for the canonical CSVs. Overrides FII_OUTPUT_DIR.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Append to existing outputs, dropping identical rows.
    #[arg(long)]
    append: bool,

    /// Run the pipeline and log the results without writing files.
    #[arg(long)]
    dry_run: bool,

    #[arg(long)]
    skip_communications: bool,

    #[arg(long)]
    skip_dividends: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut settings = fii_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    if let Some(dir) = &args.data_dir {
        settings = settings.with_data_dir(dir);
    }
    if let Some(dir) = &args.output_dir {
        settings.output_dir = dir.clone();
    }

    if let Err(err) = run(&settings, &args) {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %format!("{err:#}"), "reconciliation run failed");
        return Err(err);
    }
    Ok(())
}

fn run(settings: &fii_core::config::Settings, args: &Args) -> anyhow::Result<()> {
    let started = chrono::Utc::now();
    let pipeline = Pipeline::from_settings(settings).context("invalid pipeline configuration")?;
    let mode = if args.append {
        WriteMode::Append
    } else {
        WriteMode::Overwrite
    };
    let out = |name: &str| settings.output_dir.join(name);

    let funds = pipeline.run_funds()?;
    if !args.dry_run {
        storage::write_csv(&out(storage::FUNDS_FILE), funds.iter(), mode)?;
    }

    let communications = if args.skip_communications {
        None
    } else {
        match pipeline.run_communications() {
            Ok(c) => Some(c),
            Err(e) => {
                tracing::warn!(
                    error = %format!("{e:#}"),
                    "communications unavailable; skipping {}",
                    storage::COMMUNICATIONS_FILE
                );
                None
            }
        }
    };
    let dividends = if args.skip_dividends {
        None
    } else {
        Some(pipeline.run_dividends()?)
    };

    let last_update = fii_core::time::last_update_summary(
        funds.min_last_updated(),
        communications.as_ref().and_then(|c| c.min_last_updated()),
    );

    if args.dry_run {
        tracing::info!(
            dry_run = true,
            funds = funds.len(),
            communications = communications.as_ref().map(|c| c.len()),
            dividend_months = dividends.as_ref().map(|d| d.len()),
            %last_update,
            "worker run complete (nothing written)"
        );
        return Ok(());
    }

    if let Some(c) = &communications {
        storage::write_csv(&out(storage::COMMUNICATIONS_FILE), c.iter(), mode)?;
    }
    if let Some(d) = &dividends {
        storage::write_csv(&out(storage::DIVIDENDS_MONTHLY_FILE), d.iter(), mode)?;
    }

    let elapsed_ms = (chrono::Utc::now() - started).num_milliseconds();
    tracing::info!(
        output_dir = %settings.output_dir.display(),
        funds = funds.len(),
        %last_update,
        elapsed_ms,
        "worker run complete"
    );
    Ok(())
}

fn init_sentry(settings: &fii_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
