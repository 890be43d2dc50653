use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use soundrecorder::{
    create_router, format_elapsed, AppState, Config, JsonLinesCatalog, LogSurface,
    ProgressObserver, SessionHost, SessionParts, WavDeviceFactory,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "soundrecorder", version, about = "Background audio recording controller")]
struct Cli {
    /// Config file path (extension optional)
    #[arg(short, long, default_value = "config/soundrecorder")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP control API until Ctrl-C
    Serve,
    /// Record for a fixed time and print the cataloged artifact
    Record {
        /// Recording length in seconds
        #[arg(short, long, default_value_t = 5)]
        seconds: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));

    let settings = cfg.session_settings()?;
    info!("Recordings directory: {}", settings.storage_dir.display());

    let host = SessionHost::new(SessionParts {
        settings,
        devices: Arc::new(WavDeviceFactory {
            buffer_duration_ms: cfg.recorder.buffer_duration_ms,
        }),
        catalog: Arc::new(JsonLinesCatalog::new(cfg.catalog_path()?)),
        surface: Arc::new(LogSurface),
    });

    match cli.command {
        Command::Serve => serve(&cfg, host).await,
        Command::Record { seconds } => record(host, Duration::from_secs(seconds)).await,
    }
}

async fn serve(cfg: &Config, host: SessionHost) -> Result<()> {
    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("HTTP server listening on {}", addr);

    let router = create_router(AppState::new(host.clone()));
    let saved = host
        .run_then_shutdown(async {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = tokio::signal::ctrl_c().await;
                    info!("Ctrl-C received, shutting down");
                })
                .await
                .context("HTTP server failed")
        })
        .await?;

    if let Some(record) = saved {
        println!("{}", serde_json::to_string_pretty(&record)?);
    }

    Ok(())
}

async fn record(host: SessionHost, length: Duration) -> Result<()> {
    let session = host.bind()?;

    let observer: Arc<dyn ProgressObserver> = Arc::new(|elapsed: Duration| {
        debug!("Elapsed {}", format_elapsed(elapsed));
    });
    session.set_progress_observer(Some(&observer));

    session.start().await?;
    info!("Recording for {}s", length.as_secs());

    tokio::select! {
        _ = tokio::time::sleep(length) => {}
        _ = tokio::signal::ctrl_c() => info!("Ctrl-C received, stopping early"),
    }

    let record = session.stop().await?;
    println!("{}", serde_json::to_string_pretty(&record)?);

    session.unbind();
    host.shutdown().await?;

    Ok(())
}
