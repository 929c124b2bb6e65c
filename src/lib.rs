//! Sui Discovery: publishes apps advertised through container labels.
//!
//! Containers opt in with the `sui.app.name`, `sui.app.url` and `sui.app.icon`
//! labels. On a fixed interval the running containers are listed, their labels
//! turned into app descriptors, and the result written as an `apps.json`
//! manifest for the dashboard to read.
pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod fsutil;
pub mod manifest;
pub mod scheduler;

pub use config::Config;
pub use error::{Error, Result};

/// Runs the discovery sidecar.
///
/// Validates `config`, makes sure the manifest file exists and connects to the
/// container engine, then publishes the manifest every interval until the
/// process is terminated. With `config.once` a single cycle is run instead and
/// its failure is returned.
///
/// # Errors
///
/// Returns an [`Error`] if any startup step fails, or if the single cycle fails
/// in `once` mode. Failures of individual cycles in polling mode are logged and
/// retried, never returned.
pub async fn run(config: Config) -> Result<()> {
    config.validate()?;
    log::debug!("Configuration: {:?}", config);

    let publisher = manifest::ManifestPublisher::new(config.apps_config.clone());
    publisher.prepare()?;

    let provider = engine::Engine::connect(config.engine, config.socket_path()).await?;
    let mut scheduler = scheduler::Scheduler::new(provider, publisher, config.interval());

    if config.once {
        let report = scheduler.run_cycle().await?;
        log::info!(
            "Run finished: {} apps from {} containers",
            report.apps,
            report.containers
        );
        return Ok(());
    }

    scheduler.run().await;
    Ok(())
}
