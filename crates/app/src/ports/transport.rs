//! Transport port — session lifecycle and state IO for one appliance.
//!
//! The implementation behind this trait wraps the device's local protocol
//! (framing, encryption, timeouts). The connection it manages is explicitly
//! **not** reentrant and **not** safe for concurrent conversations; the
//! coordinator's lock is the only thing standing between two overlapping
//! calls and a corrupted session. Implementations must detect overlap and
//! report it as [`DeviceError::ConcurrencyViolation`] instead of silently
//! corrupting their read state.

use std::future::Future;

use chillhub_domain::capability::CapabilitySet;
use chillhub_domain::device::Credentials;
use chillhub_domain::error::DeviceError;
use chillhub_domain::state::DeviceState;

/// Session and state IO against a single appliance.
///
/// All fallible methods classify failures into the [`DeviceError`] taxonomy:
/// connectivity (retryable), authentication, unsupported device, and
/// concurrency violation.
pub trait DeviceTransport: Send + Sync {
    /// Open the underlying connection. Idempotent.
    fn connect(&self) -> impl Future<Output = Result<(), DeviceError>> + Send;

    /// Perform the authenticated-session handshake.
    ///
    /// Only called when credentials were configured; devices in the legacy
    /// session mode skip this entirely.
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<(), DeviceError>> + Send;

    /// Ask the device for its current property values.
    fn read_state(&self) -> impl Future<Output = Result<DeviceState, DeviceError>> + Send;

    /// Send the given property values and return the device's post-write
    /// state from its acknowledgment.
    fn write_state(
        &self,
        state: &DeviceState,
    ) -> impl Future<Output = Result<DeviceState, DeviceError>> + Send;

    /// Query the capability set. Called once during setup.
    fn read_capabilities(
        &self,
    ) -> impl Future<Output = Result<CapabilitySet, DeviceError>> + Send;

    /// Whether the device has answered on this session.
    fn is_online(&self) -> bool;

    /// Whether the device reports a recognised model and firmware.
    fn is_supported(&self) -> bool;

    /// Close the connection. The default implementation is a no-op.
    fn disconnect(&self) -> impl Future<Output = Result<(), DeviceError>> + Send {
        async { Ok(()) }
    }
}
