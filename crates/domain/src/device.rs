//! Device identity and session credentials.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Appliance identifier as assigned by the vendor cloud.
///
/// Numeric on the wire but persisted as a string; older installs stored raw
/// integers, which the options migration normalises.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceId(String);

impl DeviceId {
    /// Wrap an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// String form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for DeviceId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two appliance families the protocol distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceKind {
    /// Residential air conditioner.
    Ac,
    /// Commercial air conditioner.
    Cc,
}

impl std::str::FromStr for DeviceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AC" => Ok(Self::Ac),
            "CC" => Ok(Self::Cc),
            other => Err(format!("unknown device kind: {other}")),
        }
    }
}

/// Pre-shared token/key pair for the authenticated session mode.
///
/// Absence of credentials selects the unauthenticated/legacy session mode;
/// the choice is made once at setup and does not change at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    token: String,
    key: String,
}

impl Credentials {
    /// Build credentials from hex strings.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidHex`] when either field contains
    /// non-hexadecimal characters or is empty.
    pub fn from_hex(
        token: impl Into<String>,
        key: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let token = token.into();
        let key = key.into();
        if !is_hex(&token) {
            return Err(ValidationError::InvalidHex { field: "token" });
        }
        if !is_hex(&key) {
            return Err(ValidationError::InvalidHex { field: "key" });
        }
        Ok(Self { token, key })
    }

    /// Session token, hex encoded.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Session key, hex encoded.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Where and what to set up: address, identity, family, session mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Appliance identifier.
    pub id: DeviceId,
    /// Host name or address on the local network.
    pub host: String,
    /// TCP port of the appliance's local protocol.
    pub port: u16,
    /// Appliance family.
    pub kind: DeviceKind,
    /// Credentials for the authenticated session mode, if any.
    pub credentials: Option<Credentials>,
}
