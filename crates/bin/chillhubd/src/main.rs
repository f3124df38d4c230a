//! # chillhubd — chillhub daemon
//!
//! Composition root that wires a device transport to the coordinator and
//! runs the poll loop.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Construct the device transport
//! - Run the setup flow: connect, authenticate, discover, resolve
//! - Start the background poller
//! - Handle graceful shutdown (SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use chillhub_adapter_virtual::SimulatedAc;
use chillhub_app::ports::DeviceTransport;
use chillhub_app::setup;
use config::Config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let identity = config.device_identity()?;
    tracing::info!(
        device = %identity.id,
        host = %identity.host,
        port = identity.port,
        "starting chillhubd"
    );

    // Only the simulated transport ships today; a LAN transport slots in
    // behind the same port trait.
    let mut builder = SimulatedAc::builder();
    if let Some(credentials) = &identity.credentials {
        builder = builder.credentials(credentials.clone());
    }
    let transport = builder.build();
    let session = transport.clone();

    let outcome = setup::setup_device(transport, identity.credentials.as_ref()).await?;
    tracing::info!(
        hvac_modes = ?outcome.entities.climate.hvac_modes,
        switches = outcome.entities.switches.len(),
        "device ready"
    );

    let poller = chillhub_app::poller::start(outcome.coordinator, config.poll_interval());

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutting down");

    poller.shutdown().await;
    session.disconnect().await?;

    Ok(())
}
