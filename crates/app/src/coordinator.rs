//! Device Coordinator — single authority for all IO against one appliance.
//!
//! The device accepts only one in-flight conversation at a time, yet the
//! host issues a periodic background poll and bursty user-triggered writes
//! concurrently. Every conversation therefore goes through one
//! `tokio::sync::Mutex`; waiters are served in FIFO-ish acquisition order.
//! The coordinator also owns the Device State Cache: the cache always holds
//! either the last state validated against the live device or the result of
//! a just-acknowledged write, and is never left half-updated when an
//! operation fails partway.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};

use chillhub_domain::capability::CapabilitySet;
use chillhub_domain::error::{DeviceError, ValidationError};
use chillhub_domain::state::DeviceState;

use crate::ports::DeviceTransport;

/// Serialises refresh/apply against one appliance and caches its state.
///
/// Cheap to clone; all clones share the same lock, cache, and transport.
pub struct DeviceCoordinator<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for DeviceCoordinator<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<T> {
    transport: T,
    capabilities: CapabilitySet,
    /// Guards every device conversation. Never held across cache reads by
    /// entities, only across IO.
    io_lock: Mutex<()>,
    cache: RwLock<CacheSlot>,
    /// Bumped after every conversation that left the cache freshly
    /// validated against the device (successful refresh or apply).
    /// Used for single-flight coalescing of concurrent refreshes.
    generation: AtomicU64,
}

#[derive(Debug, Clone)]
struct CacheSlot {
    state: DeviceState,
    last_refresh: Option<DateTime<Utc>>,
}

impl<T: DeviceTransport> DeviceCoordinator<T> {
    /// Build a coordinator around an established transport.
    ///
    /// `initial_state` is the state fetched during setup; the cache starts
    /// from it rather than from a made-up default.
    #[must_use]
    pub fn new(transport: T, capabilities: CapabilitySet, initial_state: DeviceState) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                capabilities,
                io_lock: Mutex::new(()),
                cache: RwLock::new(CacheSlot {
                    state: initial_state,
                    last_refresh: Some(Utc::now()),
                }),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// The capability set discovered at setup.
    #[must_use]
    pub fn capabilities(&self) -> &CapabilitySet {
        &self.inner.capabilities
    }

    /// Read-only snapshot of the last-known device state.
    pub async fn state(&self) -> DeviceState {
        self.inner.cache.read().await.state.clone()
    }

    /// When the cache was last validated against the live device.
    pub async fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.inner.cache.read().await.last_refresh
    }

    /// Whether the device answered on the current session.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.inner.transport.is_online()
    }

    /// Pull the device's current values into the cache.
    ///
    /// Concurrent callers coalesce: a caller that waited out another
    /// refresh (or an apply, whose acknowledgment is equally fresh) reuses
    /// that result instead of starting a second conversation. On success
    /// the cache is overwritten wholesale; on failure it is untouched.
    ///
    /// # Errors
    ///
    /// Propagates the classified [`DeviceError`] from the transport.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), DeviceError> {
        let observed = self.inner.generation.load(Ordering::Acquire);
        let _guard = self.inner.io_lock.lock().await;
        if self.inner.generation.load(Ordering::Acquire) != observed {
            tracing::debug!("coalesced into a refresh that completed while waiting");
            return Ok(());
        }

        let state = self.inner.transport.read_state().await?;
        self.commit(state).await;
        Ok(())
    }

    /// Mutate the pending property set and push the changes to the device.
    ///
    /// Waits for any in-flight refresh to finish and blocks any refresh
    /// that starts while the write is in flight. The mutator runs against a
    /// clone of the cache; its changes are validated against the discovered
    /// capability set before any IO, so a value the device never reported is
    /// never sent. The cache is updated from the device's acknowledgment,
    /// only after the device acknowledged.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::Validation`] for out-of-capability values
    /// (no IO performed), otherwise the classified transport error.
    #[tracing::instrument(skip(self, mutate))]
    pub async fn apply<F>(&self, mutate: F) -> Result<(), DeviceError>
    where
        F: FnOnce(&mut DeviceState),
    {
        let _guard = self.inner.io_lock.lock().await;

        let prior = self.inner.cache.read().await.state.clone();
        let mut pending = prior.clone();
        mutate(&mut pending);
        self.validate_pending(&prior, &pending)?;

        let acked = self.inner.transport.write_state(&pending).await?;
        self.commit(acked).await;
        Ok(())
    }

    /// Overwrite the cache atomically and publish a new generation.
    async fn commit(&self, state: DeviceState) {
        {
            let mut slot = self.inner.cache.write().await;
            slot.state = state;
            slot.last_refresh = Some(Utc::now());
        }
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Reject changed discrete values the device never reported supporting.
    /// Unchanged fields are left alone even when they hold codes outside the
    /// capability set (some units report quirk values we must not touch).
    fn validate_pending(
        &self,
        prior: &DeviceState,
        pending: &DeviceState,
    ) -> Result<(), ValidationError> {
        let caps = &self.inner.capabilities;

        if pending.mode != prior.mode && !caps.supports_mode_code(pending.mode) {
            return Err(ValidationError::UnsupportedValue {
                property: "mode",
                code: pending.mode,
            });
        }
        if pending.fan_speed != prior.fan_speed && !caps.supports_fan_code(pending.fan_speed) {
            return Err(ValidationError::UnsupportedValue {
                property: "fan_speed",
                code: pending.fan_speed,
            });
        }
        if pending.swing_mode != prior.swing_mode && !caps.supports_swing_code(pending.swing_mode)
        {
            return Err(ValidationError::UnsupportedValue {
                property: "swing_mode",
                code: pending.swing_mode,
            });
        }
        if pending.purifier != prior.purifier
            && let Some(code) = pending.purifier
            && !caps.supports_purifier_code(code)
        {
            return Err(ValidationError::UnsupportedValue {
                property: "purifier",
                code,
            });
        }
        if pending.target_temperature != prior.target_temperature
            && !caps.temperature_in_range(pending.target_temperature)
        {
            return Err(ValidationError::TemperatureOutOfRange {
                value: pending.target_temperature,
                min: caps.min_target_temperature,
                max: caps.max_target_temperature,
            });
        }
        Ok(())
    }
}
