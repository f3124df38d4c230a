//! # chillhub-domain
//!
//! Pure domain model for the chillhub appliance manager.
//!
//! ## Responsibilities
//! - Define the **Capability Set** — the per-unit enumeration of supported
//!   property values, discovered once at setup
//! - Define the **Device State** — the in-memory mirror of the appliance's
//!   last-known property values
//! - Define **entity configuration** — the derived, read-only options and
//!   feature flags each entity exposes
//! - Define device identity, credentials, and the error taxonomy shared by
//!   every layer
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod capability;
pub mod device;
pub mod entity_config;
pub mod error;
pub mod state;
