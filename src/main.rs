use clap::Parser;

/// Entry point for the Sui Discovery sidecar.
///
/// Watches the running containers of the local Docker (or containerd) engine and
/// keeps the dashboard's `apps.json` in sync with their `sui.app.*` labels.
///
/// # Errors
///
/// Exits with an error if startup fails (invalid flags, unwritable manifest
/// path, unreachable engine) or, with `--once`, if the single run fails.
///
/// # Examples
///
/// ```bash
/// RUST_LOG=info sui-discovery --apps-config ./config/apps.json --interval 30
/// ```
#[tokio::main(flavor = "current_thread")]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let config = sui_discovery::Config::parse();
    if let Err(err) = sui_discovery::run(config).await {
        log::error!("{}", err);
        return Err(err.into());
    }
    Ok(())
}
