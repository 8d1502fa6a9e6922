//! Gatesync binary entry point.
//!
//! Wires configuration, the Kafka stream, the context broker client and the
//! shutdown signal listener together, then executes one synchronization run.
//! The process exits non-zero on any unrecovered error and zero on a clean
//! flush or a graceful shutdown.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use gatesync::broker::ContextBrokerClient;
use gatesync::cli::Cli;
use gatesync::logging::{init_logging, LoggingConfig};
use gatesync::stream::KafkaEventStream;
use gatesync::{RunOutcome, SiteLocationTable, SyncConfig, SyncVehicles, VehicleTransformer};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(&LoggingConfig {
        level: cli.log_level.clone(),
        json_format: cli.json_logs,
        file_path: cli.log_file.clone(),
    })?;

    if let Err(err) = run(cli).await {
        // Every fatal error ends up here with its cause chain; there is no
        // silent failure path.
        let cause = format!("{:#}", err);
        error!(error = %cause, "synchronization failed");
        std::process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    // A missing .env file is fine; the environment may already be populated.
    if let Err(err) = dotenvy::from_path(&cli.env_file) {
        debug!(path = %cli.env_file.display(), error = %err, "no .env file loaded");
    }

    let config = SyncConfig::from_env().context("cannot read configuration")?;
    info!(
        broker = %config.broker.base_url,
        topic = %config.kafka.topic,
        group_id = %config.kafka.group_id,
        "configuration loaded"
    );

    let stream =
        KafkaEventStream::connect(&config.kafka).context("cannot connect stream consumer")?;
    let persistor = ContextBrokerClient::new(&config.broker)
        .context("cannot instantiate context broker client")?;
    let transformer =
        VehicleTransformer::new(SiteLocationTable::default(), config.default_vehicle_speed);

    let shutdown = CancellationToken::new();
    spawn_signal_listener(shutdown.clone());

    let sync = SyncVehicles::new(stream, persistor, transformer);
    let outcome = sync
        .execute(shutdown)
        .await
        .context("cannot sync vehicles on context broker")?;

    match outcome {
        RunOutcome::Flushed { written } => info!(written, "synchronization complete"),
        RunOutcome::Aborted => info!("synchronization aborted by shutdown signal"),
    }

    Ok(())
}

/// Cancels the run token on SIGINT or SIGTERM.
///
/// The listener is the only concurrent actor next to the synchronization
/// loop; it never touches run state directly.
fn spawn_signal_listener(token: CancellationToken) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(err) => {
                    error!(error = %err, "cannot install SIGTERM handler");
                    return;
                }
            };

            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }

        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }

        info!("shutdown signal received");
        token.cancel();
    });
}
