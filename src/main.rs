use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use wayfarer::config::AppConfig;
use wayfarer::discovery::DiscoveryProber;
use wayfarer::error::Result;
use wayfarer::registry::AgentRegistry;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    init_logging(&config);

    if let Err(errors) = config.validate() {
        for e in &errors {
            error!("config: {e}");
        }
        return Err(wayfarer::WayfarerError::Validation(errors.join("; ")));
    }

    let registry = Arc::new(AgentRegistry::new());
    let prober = Arc::new(DiscoveryProber::new(
        registry.clone(),
        config.discovery.clone(),
    )?);

    // Initial cycle so the hub starts with a populated registry.
    let health = prober.run_once().await;
    info!(
        "ecosystem: {}/{} agents discovered, score {:.1} ({}), essential capabilities {}/{}, redundancy {}",
        health.discovered,
        health.expected,
        health.score,
        health.status,
        health.essential_capabilities_covered,
        health.essential_capabilities_total,
        health.redundancy_level
    );

    let loop_prober = prober.clone();
    let discovery_task = tokio::spawn(async move {
        loop_prober.run_forever().await;
    });

    info!("wayfarer discovery hub running, press ctrl-c to stop");
    signal::ctrl_c().await?;
    warn!("shutdown signal received");
    discovery_task.abort();

    Ok(())
}

fn init_logging(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},wayfarer=debug", config.logging.level)));

    // Optional daily-rotating file layer. tracing_appender panics if it
    // cannot create the initial log file, so preflight writability first.
    let log_dir = std::env::var("WAYFARER_LOG_DIR").ok();
    let file_layer = log_dir.and_then(|dir| {
        if std::fs::create_dir_all(&dir).is_err() {
            eprintln!("Warning: could not create log directory {dir}, file logging disabled");
            return None;
        }
        let test_path = std::path::Path::new(&dir).join(".wayfarer_write_test");
        match std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&test_path)
        {
            Ok(_) => {
                let _ = std::fs::remove_file(&test_path);
                let appender = tracing_appender::rolling::daily(&dir, "wayfarer.log");
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);
                // Keep the guard alive for the life of the process.
                Box::leak(Box::new(guard));
                Some(
                    tracing_subscriber::fmt::layer()
                        .with_writer(non_blocking)
                        .with_ansi(false)
                        .with_target(true),
                )
            }
            Err(e) => {
                eprintln!("Warning: could not write to log directory {dir} ({e}), file logging disabled");
                None
            }
        }
    });

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();
}
