//! # chillhub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define the **transport port** that adapters implement (driven/outbound):
//!   - `DeviceTransport` — session lifecycle and state IO for one appliance
//! - Provide the **use-case** components:
//!   - `DeviceCoordinator` — serialises all device IO, owns the state cache
//!   - `resolver::resolve` — derives entity configuration from a capability set
//!   - `setup::setup_device` — connect/authenticate/discover, classify failures
//!   - `poller` — background refresh on a fixed interval, cleanly cancellable
//!   - `migration` — versioned transformation of persisted options
//!
//! ## Dependency rule
//! Depends on `chillhub-domain` only (plus `tokio::sync`/`tokio::time` for
//! the lock and timers). Never imports adapter crates. Adapters depend on
//! *this* crate, not the reverse.

pub mod coordinator;
pub mod migration;
pub mod poller;
pub mod ports;
pub mod resolver;
pub mod setup;
