//! # chillhub-adapter-virtual
//!
//! A simulated air-conditioning unit behind the [`DeviceTransport`] port.
//!
//! The simulation reproduces the one property of the real connection that
//! matters to the core: it is **not** reentrant. Each call runs a
//! "conversation" with a configurable latency, and a second conversation
//! starting while one is in flight fails with
//! [`DeviceError::ConcurrencyViolation`] — exactly what a real session
//! object does when two requests interleave on its read buffer. Fault
//! injection knobs cover the rest of the error taxonomy.
//!
//! ## Dependency rule
//!
//! Depends on `chillhub-app` (port traits) and `chillhub-domain` only.

mod device;

pub use device::{SimulatedAc, SimulatedAcBuilder};
