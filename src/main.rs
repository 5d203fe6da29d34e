use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use radio_scheduler::{config::Config, database::Database, seed::seed_sample_data, web::WebServer};

#[derive(Parser)]
#[command(name = "radio-scheduler", version)]
#[command(about = "Schedules radio programs, their hosts and their music")]
struct Cli {
    /// TOML configuration, written with defaults when missing
    #[arg(short, long, default_value = "config.toml", env = "CONFIG_FILE")]
    config: PathBuf,

    /// Address to bind, e.g. 127.0.0.1
    #[arg(short = 'H', long = "host", value_name = "IP")]
    bind_host: Option<String>,

    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// SQLite connection string, e.g. sqlite://./radio.db
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Insert random hosts, musics and programs into an empty database
    #[arg(long)]
    seed: bool,

    /// Fixed seed for reproducible sample data
    #[arg(long, value_name = "N", requires = "seed")]
    rng_seed: Option<u64>,

    /// One of error, warn, info, debug or trace
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

impl Cli {
    fn apply_to(&self, config: &mut Config) {
        if let Some(host) = &self.bind_host {
            config.web.host = host.clone();
        }
        if let Some(port) = self.port {
            config.web.port = port;
        }
        if let Some(url) = &self.database_url {
            config.database.url = url.clone();
        }
        if self.seed {
            config.seed.enabled = true;
        }
        if self.rng_seed.is_some() {
            config.seed.rng_seed = self.rng_seed;
        }
    }
}

/// `RUST_LOG` wins over `--log-level` when set
fn init_tracing(level: &str) {
    let fallback = match level {
        "trace" => "radio_scheduler=trace,sqlx=debug".to_string(),
        other => format!("radio_scheduler={other},sqlx=warn"),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let mut config = Config::load_from(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    cli.apply_to(&mut config);
    info!(
        "radio-scheduler {} using {} ({})",
        env!("CARGO_PKG_VERSION"),
        config.database.url,
        cli.config.display()
    );

    let database = Database::new(&config.database).await?;
    database.migrate().await?;

    if config.seed.enabled {
        match seed_sample_data(&database, &config.seed).await {
            Ok(summary) if summary.is_empty() => info!("Sample data seeding skipped"),
            Ok(_) => {}
            Err(e) => warn!("Sample data seeding failed: {}", e),
        }
    }

    let server = WebServer::new(&config, database)?;
    info!("Starting web server on {}", server.bind_addr());
    server.serve().await
}
