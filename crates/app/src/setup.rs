//! Setup flow — connect, authenticate, discover, resolve.
//!
//! Runs once per device registration. Failures are classified into the
//! stable reasons the host's configuration UI renders (`cannot_connect`,
//! `invalid_auth`, `unsupported_device`); no entities are materialised on
//! any failure path.

use chillhub_domain::device::Credentials;
use chillhub_domain::error::{ConnectivityError, DeviceError};

use crate::coordinator::DeviceCoordinator;
use crate::ports::DeviceTransport;
use crate::resolver::{self, ResolvedEntities};

/// Result of a successful setup: a live coordinator plus the entity
/// configuration the host should materialise.
pub struct SetupOutcome<T> {
    /// Coordinator owning the transport and the state cache.
    pub coordinator: DeviceCoordinator<T>,
    /// Resolved entity configuration.
    pub entities: ResolvedEntities,
}

impl<T> std::fmt::Debug for SetupOutcome<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetupOutcome")
            .field("entities", &self.entities)
            .finish_non_exhaustive()
    }
}

/// Bring a device online and derive its entity configuration.
///
/// Order matters and mirrors the session handshake: connect, then
/// authenticate (only when credentials are configured — a failed handshake
/// means the first state read is never attempted), then one state read,
/// then the online and supported checks, then capability discovery.
///
/// # Errors
///
/// - [`DeviceError::Authentication`] when the handshake is rejected;
///   never retried automatically.
/// - [`DeviceError::Connectivity`] when the device cannot be reached or
///   authenticates but never reports itself online (`cannot_connect`).
/// - [`DeviceError::UnsupportedDevice`] when the device responds but
///   reports an unrecognised model; fatal to setup.
/// - [`DeviceError::Validation`] when the discovered capability set breaks
///   a mandatory invariant.
#[tracing::instrument(skip(transport, credentials), fields(authenticated = credentials.is_some()))]
pub async fn setup_device<T: DeviceTransport>(
    transport: T,
    credentials: Option<&Credentials>,
) -> Result<SetupOutcome<T>, DeviceError> {
    transport.connect().await?;

    if let Some(credentials) = credentials {
        transport.authenticate(credentials).await?;
    }

    let state = transport.read_state().await?;

    if !transport.is_online() {
        tracing::warn!("device answered the session but never reported itself online");
        return Err(ConnectivityError::SessionNotEstablished.into());
    }
    if !transport.is_supported() {
        return Err(DeviceError::UnsupportedDevice);
    }

    let capabilities = transport.read_capabilities().await?;
    capabilities.validate()?;

    let entities = resolver::resolve(&capabilities);
    tracing::info!(
        hvac_modes = ?entities.climate.hvac_modes,
        switches = entities.switches.len(),
        "device setup complete"
    );

    Ok(SetupOutcome {
        coordinator: DeviceCoordinator::new(transport, capabilities, state),
        entities,
    })
}
