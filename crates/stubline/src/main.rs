use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use stubline::admin_api::StublineServer;
use stubline::application::ApplicationManager;
use stubline::config::{Config, LogFormat, LoggingConfig, StorageBackend};
use stubline::store::create_rule_store;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "stubline")]
#[command(author, version, about = "HTTP stub server replaying canned responses", long_about = None)]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long, env = "STUBLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "STUBLINE_PORT")]
    port: Option<u16>,

    /// Host address to bind
    #[arg(long, env = "STUBLINE_HOST")]
    host: Option<String>,

    /// Directory holding the rule records
    #[arg(long, env = "STUBLINE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Storage backend: file or inmemory
    #[arg(long, env = "STUBLINE_STORAGE")]
    storage: Option<StorageBackend>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, env = "STUBLINE_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: text or json
    #[arg(long, env = "STUBLINE_LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

impl Args {
    fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => Config::default(),
        };

        if let Some(port) = self.port {
            config.listen.port = port;
        }
        if let Some(host) = &self.host {
            config.listen.host = host.clone();
        }
        if let Some(data_dir) = &self.data_dir {
            config.storage.data_dir = data_dir.clone();
        }
        if let Some(backend) = self.storage {
            config.storage.backend = backend;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| logging.level.as_str().into());

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Received Ctrl+C");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = args.load_config()?;

    init_tracing(&config.logging);

    info!("stubline v{} starting", env!("CARGO_PKG_VERSION"));
    info!(
        backend = config.storage.backend.as_str(),
        data_dir = %config.storage.data_dir.display(),
        "Rule storage configured"
    );

    let store = create_rule_store(&config.storage)?;
    let manager = Arc::new(ApplicationManager::new(store));
    let server = StublineServer::new(manager, config.replay.clone());

    server
        .run(&config.listen.bind_address(), shutdown_signal())
        .await
}
