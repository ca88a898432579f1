//! Checkpoint Wait CLI
//!
//! Serves crowd-sourced airport security wait times.

use checkpoint_wait::{
    config::{parse_timezone, Config},
    core::{estimator, Estimator, Tier, WaitLevel},
    VERSION,
};
use chrono::{Datelike, Timelike, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "checkpoint-wait")]
#[command(version = VERSION)]
#[command(about = "Crowd-sourced airport security checkpoint wait times", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Timezone for estimates, e.g. America/Chicago (overrides config)
        #[arg(long)]
        timezone: Option<String>,

        /// Skip loading sample airports and reports
        #[arg(long)]
        no_seed: bool,
    },

    /// Print the baseline estimate for an airport code
    Estimate {
        /// Airport code, e.g. ATL
        code: String,

        /// Timezone for the local hour and weekday (overrides config)
        #[arg(long)]
        timezone: Option<String>,
    },

    /// Show configuration
    Config,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Serve {
            port,
            host,
            timezone,
            no_seed,
        } => cmd_serve(port, host, timezone, no_seed),
        Commands::Estimate { code, timezone } => cmd_estimate(&code, timezone),
        Commands::Config => cmd_config(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_config() -> Config {
    Config::load().unwrap_or_else(|e| {
        tracing::warn!("Falling back to default configuration: {e}");
        Config::default()
    })
}

#[cfg(feature = "server")]
fn cmd_serve(
    port: Option<u16>,
    host: Option<String>,
    timezone: Option<String>,
    no_seed: bool,
) -> anyhow::Result<()> {
    use checkpoint_wait::{
        activity::{create_shared_log, create_shared_log_with_persistence},
        core::{system_clock, Aggregator, SharedStore},
        server::{run, ServerConfig},
        store::{seed_if_empty, MemoryStore},
    };
    use std::sync::Arc;
    use tokio::sync::Notify;

    let mut config = load_config();
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(timezone) = timezone {
        config.timezone = timezone;
    }

    let tz = config.parse_timezone()?;
    let settings = config.aggregator_settings()?;
    let clock = system_clock();

    let (store, activity) = if config.persist_reports {
        config.ensure_directories()?;
        let store = MemoryStore::with_persistence(config.store_path(), clock.clone())?;
        (store, create_shared_log_with_persistence(config.activity_path()))
    } else {
        (MemoryStore::with_clock(clock.clone()), create_shared_log())
    };
    let store: SharedStore = Arc::new(store);

    if config.seed_on_start && !no_seed {
        seed_if_empty(store.as_ref(), clock.now())?;
    }

    let aggregator = Aggregator::new(
        store,
        Estimator::system(tz),
        clock,
        settings,
        activity.clone(),
    );

    let shutdown = Arc::new(Notify::new());
    let signal = shutdown.clone();
    ctrlc::set_handler(move || signal.notify_one())?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let server_config = ServerConfig::new(config.host.clone(), config.port);
        let (addr, shutdown_tx) = run(server_config, aggregator).await?;
        println!("Serving checkpoint wait times on http://{addr}");
        println!("Press Ctrl+C to stop.");

        shutdown.notified().await;
        let _ = shutdown_tx.send(());
        anyhow::Ok(())
    })?;

    println!();
    println!("{}", activity.summary());
    if let Err(e) = activity.save() {
        tracing::warn!("Failed to save activity stats: {e}");
    }

    Ok(())
}

#[cfg(not(feature = "server"))]
fn cmd_serve(
    _port: Option<u16>,
    _host: Option<String>,
    _timezone: Option<String>,
    _no_seed: bool,
) -> anyhow::Result<()> {
    anyhow::bail!("built without the `server` feature")
}

fn cmd_estimate(code: &str, timezone: Option<String>) -> anyhow::Result<()> {
    let tz = match timezone {
        Some(name) => parse_timezone(&name)?,
        None => load_config().parse_timezone()?,
    };

    let code = code.trim().to_uppercase();
    let estimator = Estimator::system(tz);
    let local = Utc::now().with_timezone(&estimator.timezone());
    let (hour, day) = (local.hour(), local.weekday());
    let tier = Tier::classify(&code);
    let minutes = estimator.estimate_at(&code, hour, day);

    println!("Estimate for {code}");
    println!("=================");
    println!();
    println!("Local time:     {} ({})", local.format("%a %H:%M"), estimator.timezone());
    println!("Tier:           {tier:?} (base {} min)", tier.base_wait());
    println!(
        "Multipliers:    time of day x{}, day of week x{}",
        estimator::time_of_day_multiplier(hour),
        estimator::day_of_week_multiplier(day)
    );
    println!(
        "Estimated wait: {minutes} min ({})",
        WaitLevel::from_minutes(minutes).label()
    );

    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    let config = load_config();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}
