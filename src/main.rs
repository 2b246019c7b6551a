use clap::Parser;
use failoverd::{Application, Config, telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // reqwest is built with rustls-no-provider; install the crypto provider
    // before the first TLS client is constructed
    rustls::crypto::aws_lc_rs::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let args = failoverd::config::Args::parse();
    let config = Config::load(&args)?;

    // --validate: parse-and-exit mode for CI and deploy pipelines
    if args.validate {
        println!("Configuration is valid.");
        return Ok(());
    }

    telemetry::init_telemetry()?;

    tracing::info!(
        "Monitoring {} ({}:{}) / {} ({}:{})",
        config.primary.name,
        config.primary.host,
        config.primary.port,
        config.secondary.name,
        config.secondary.host,
        config.secondary.port,
    );

    Application::new(config)?.serve(shutdown_signal()).await
}

/// Resolves on SIGTERM or Ctrl+C.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c().await.expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down gracefully..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down gracefully..."),
    }
}
