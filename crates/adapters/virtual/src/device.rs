//! The simulated appliance and its fault-injection builder.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chillhub_app::ports::DeviceTransport;
use chillhub_domain::capability::CapabilitySet;
use chillhub_domain::device::Credentials;
use chillhub_domain::error::{ConnectivityError, DeviceError};
use chillhub_domain::state::DeviceState;

/// Simulated air-conditioning unit.
///
/// Cheap to clone; every clone shares the same connection and state, so a
/// test can hand one clone to the coordinator and keep another to inspect
/// the device or to bypass the lock on purpose.
#[derive(Clone)]
pub struct SimulatedAc {
    shared: Arc<Shared>,
}

struct Shared {
    state: Mutex<DeviceState>,
    capabilities: CapabilitySet,
    expected_credentials: Option<Credentials>,
    latency: Duration,

    connected: AtomicBool,
    authenticated: AtomicBool,
    online: AtomicBool,
    supported: AtomicBool,
    refuse_connection: AtomicBool,
    /// Conversation in flight. The real connection corrupts its read buffer
    /// when this would be violated; the simulation raises instead.
    busy: AtomicBool,

    fail_reads: AtomicU32,
    fail_writes: AtomicU32,

    connect_calls: AtomicU32,
    auth_calls: AtomicU32,
    read_calls: AtomicU32,
    write_calls: AtomicU32,
}

/// RAII marker for one in-flight conversation.
struct Conversation<'a> {
    busy: &'a AtomicBool,
}

impl Drop for Conversation<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
    }
}

impl SimulatedAc {
    /// Start building a simulated unit.
    #[must_use]
    pub fn builder() -> SimulatedAcBuilder {
        SimulatedAcBuilder::default()
    }

    /// A healthy, reachable, supported unit with default capabilities.
    #[must_use]
    pub fn healthy() -> Self {
        Self::builder().build()
    }

    /// Snapshot of the simulated unit's own state.
    #[must_use]
    pub fn device_state(&self) -> DeviceState {
        self.lock_state().clone()
    }

    /// Replace the simulated unit's state out-of-band, as if a remote or
    /// an IR handset changed it.
    pub fn set_device_state(&self, state: DeviceState) {
        *self.lock_state() = state;
    }

    /// Flip the online flag at runtime.
    pub fn set_online(&self, online: bool) {
        self.shared.online.store(online, Ordering::SeqCst);
    }

    /// Make the next `count` state reads fail with a timeout.
    pub fn script_read_failures(&self, count: u32) {
        self.shared.fail_reads.store(count, Ordering::SeqCst);
    }

    /// Make the next `count` state writes fail with a timeout.
    pub fn script_write_failures(&self, count: u32) {
        self.shared.fail_writes.store(count, Ordering::SeqCst);
    }

    /// How many state reads the unit has served or rejected.
    #[must_use]
    pub fn read_calls(&self) -> u32 {
        self.shared.read_calls.load(Ordering::SeqCst)
    }

    /// How many state writes the unit has served or rejected.
    #[must_use]
    pub fn write_calls(&self) -> u32 {
        self.shared.write_calls.load(Ordering::SeqCst)
    }

    /// How many handshakes the unit has seen.
    #[must_use]
    pub fn auth_calls(&self) -> u32 {
        self.shared.auth_calls.load(Ordering::SeqCst)
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, DeviceState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_conversation(&self) -> Result<Conversation<'_>, DeviceError> {
        if self.shared.busy.swap(true, Ordering::SeqCst) {
            tracing::error!("overlapping conversation on the simulated session");
            return Err(DeviceError::ConcurrencyViolation);
        }
        Ok(Conversation {
            busy: &self.shared.busy,
        })
    }

    fn check_session(&self) -> Result<(), DeviceError> {
        if !self.shared.connected.load(Ordering::SeqCst) {
            return Err(ConnectivityError::SessionNotEstablished.into());
        }
        if self.shared.expected_credentials.is_some()
            && !self.shared.authenticated.load(Ordering::SeqCst)
        {
            return Err(ConnectivityError::SessionNotEstablished.into());
        }
        Ok(())
    }

    async fn converse(&self) -> Result<Conversation<'_>, DeviceError> {
        let conversation = self.begin_conversation()?;
        tokio::time::sleep(self.shared.latency).await;
        Ok(conversation)
    }
}

impl DeviceTransport for SimulatedAc {
    async fn connect(&self) -> Result<(), DeviceError> {
        self.shared.connect_calls.fetch_add(1, Ordering::SeqCst);
        let _conversation = self.converse().await?;
        if self.shared.refuse_connection.load(Ordering::SeqCst) {
            return Err(ConnectivityError::Refused.into());
        }
        self.shared.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn authenticate(&self, credentials: &Credentials) -> Result<(), DeviceError> {
        self.shared.auth_calls.fetch_add(1, Ordering::SeqCst);
        let _conversation = self.converse().await?;
        if !self.shared.connected.load(Ordering::SeqCst) {
            return Err(ConnectivityError::SessionNotEstablished.into());
        }
        match &self.shared.expected_credentials {
            Some(expected) if expected == credentials => {
                self.shared.authenticated.store(true, Ordering::SeqCst);
                Ok(())
            }
            Some(_) => Err(DeviceError::Authentication),
            // Legacy session mode: the unit ignores handshake attempts.
            None => Ok(()),
        }
    }

    async fn read_state(&self) -> Result<DeviceState, DeviceError> {
        self.shared.read_calls.fetch_add(1, Ordering::SeqCst);
        let _conversation = self.converse().await?;
        self.check_session()?;
        if self.shared.fail_reads.load(Ordering::SeqCst) > 0 {
            self.shared.fail_reads.fetch_sub(1, Ordering::SeqCst);
            return Err(ConnectivityError::Timeout.into());
        }
        Ok(self.lock_state().clone())
    }

    async fn write_state(&self, state: &DeviceState) -> Result<DeviceState, DeviceError> {
        self.shared.write_calls.fetch_add(1, Ordering::SeqCst);
        let _conversation = self.converse().await?;
        self.check_session()?;
        if self.shared.fail_writes.load(Ordering::SeqCst) > 0 {
            self.shared.fail_writes.fetch_sub(1, Ordering::SeqCst);
            return Err(ConnectivityError::Timeout.into());
        }
        let mut current = self.lock_state();
        *current = state.clone();
        Ok(current.clone())
    }

    async fn read_capabilities(&self) -> Result<CapabilitySet, DeviceError> {
        let _conversation = self.converse().await?;
        self.check_session()?;
        Ok(self.shared.capabilities.clone())
    }

    fn is_online(&self) -> bool {
        self.shared.online.load(Ordering::SeqCst)
    }

    fn is_supported(&self) -> bool {
        self.shared.supported.load(Ordering::SeqCst)
    }

    async fn disconnect(&self) -> Result<(), DeviceError> {
        self.shared.connected.store(false, Ordering::SeqCst);
        self.shared.authenticated.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Step-by-step builder for a [`SimulatedAc`].
#[derive(Debug)]
pub struct SimulatedAcBuilder {
    capabilities: CapabilitySet,
    initial_state: DeviceState,
    expected_credentials: Option<Credentials>,
    latency: Duration,
    online: bool,
    supported: bool,
    refuse_connection: bool,
}

impl Default for SimulatedAcBuilder {
    fn default() -> Self {
        Self {
            capabilities: CapabilitySet::default(),
            initial_state: DeviceState::default(),
            expected_credentials: None,
            latency: Duration::from_millis(20),
            online: true,
            supported: true,
            refuse_connection: false,
        }
    }
}

impl SimulatedAcBuilder {
    /// Capability set the unit reports at discovery.
    #[must_use]
    pub fn capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// State the unit starts in.
    #[must_use]
    pub fn initial_state(mut self, state: DeviceState) -> Self {
        self.initial_state = state;
        self
    }

    /// Require the authenticated session mode with these credentials.
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.expected_credentials = Some(credentials);
        self
    }

    /// Round-trip latency of one conversation.
    #[must_use]
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// The unit answers but never reports itself online.
    #[must_use]
    pub fn offline(mut self) -> Self {
        self.online = false;
        self
    }

    /// The unit reports an unrecognised model.
    #[must_use]
    pub fn unsupported(mut self) -> Self {
        self.supported = false;
        self
    }

    /// The unit actively refuses connections.
    #[must_use]
    pub fn refuse_connection(mut self) -> Self {
        self.refuse_connection = true;
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> SimulatedAc {
        SimulatedAc {
            shared: Arc::new(Shared {
                state: Mutex::new(self.initial_state),
                capabilities: self.capabilities,
                expected_credentials: self.expected_credentials,
                latency: self.latency,
                connected: AtomicBool::new(false),
                authenticated: AtomicBool::new(false),
                online: AtomicBool::new(self.online),
                supported: AtomicBool::new(self.supported),
                refuse_connection: AtomicBool::new(self.refuse_connection),
                busy: AtomicBool::new(false),
                fail_reads: AtomicU32::new(0),
                fail_writes: AtomicU32::new(0),
                connect_calls: AtomicU32::new(0),
                auth_calls: AtomicU32::new(0),
                read_calls: AtomicU32::new(0),
                write_calls: AtomicU32::new(0),
            }),
        }
    }
}
