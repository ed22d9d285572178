use anyhow::{Context, Result};
use clap::Parser;
use config_loader::SettingsLoader;
use diagnosis_api::{create_app, AppState};
use std::path::PathBuf;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "diagnosis-api", version, about = "API for executing diagnosis scripts on text datasets")]
struct Cli {
    /// Address to bind
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,
    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,
    /// Dotenv file consulted for SCRIPT_PATH and LOG_DIR
    #[arg(long, value_name = "FILE", default_value = ".env")]
    env_file: PathBuf,
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "diagnosis_api=info,job_launcher=info,config_loader=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("Shutdown signal received; launched jobs keep running");
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let settings = SettingsLoader::with_env_file(&cli.env_file)
        .load()
        .context("Failed to load settings")?;
    settings
        .prepare_log_dir()
        .context("Failed to prepare log directory")?;

    info!(
        script = %settings.script_path.display(),
        log_dir = %settings.log_dir.display(),
        "Settings loaded"
    );

    let app = create_app(AppState::new(&settings));

    let listener = tokio::net::TcpListener::bind((cli.host.as_str(), cli.port))
        .await
        .with_context(|| format!("Failed to bind to {}:{}", cli.host, cli.port))?;

    info!("Server starting on http://{}:{}", cli.host, cli.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server failed to start")?;

    Ok(())
}
