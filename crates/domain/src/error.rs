//! Error taxonomy shared across the workspace.
//!
//! The four classes matter because they are handled differently:
//! connectivity failures are retried on the next poll tick, authentication
//! and unsupported-device failures abort setup and are never retried, and a
//! concurrency violation signals a defect in the lock discipline rather than
//! a device condition.

/// Top-level error for all device-facing operations.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    /// The device could not be reached or the session dropped mid-flight.
    /// Expected in normal operation; the background poll retries next tick.
    #[error("cannot reach device")]
    Connectivity(#[from] ConnectivityError),

    /// The device rejected the pre-shared credentials during the session
    /// handshake. Never retried automatically.
    #[error("device rejected the provided credentials")]
    Authentication,

    /// The device is reachable and authenticated but reports an unrecognised
    /// model or firmware. Fatal to setup.
    #[error("device reports an unsupported model or firmware")]
    UnsupportedDevice,

    /// Two conversations overlapped on the non-reentrant device connection.
    /// This is an internal-invariant breach, not a device condition.
    #[error("overlapping conversations on a non-reentrant device connection")]
    ConcurrencyViolation,

    /// A value failed validation before any IO was attempted.
    #[error("validation error")]
    Validation(#[from] ValidationError),
}

impl DeviceError {
    /// Stable identifier for the host's configuration UI.
    ///
    /// These strings are part of the persisted/user-facing contract and must
    /// not change across releases.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Connectivity(_) => "cannot_connect",
            Self::Authentication => "invalid_auth",
            Self::UnsupportedDevice => "unsupported_device",
            Self::ConcurrencyViolation => "concurrency_violation",
            Self::Validation(_) => "invalid_value",
        }
    }

    /// Whether the next poll tick may reasonably retry the operation.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }
}

/// Details about why the device could not be reached.
#[derive(Debug, thiserror::Error)]
pub enum ConnectivityError {
    /// The device did not answer within the connection-level timeout.
    #[error("connection timed out")]
    Timeout,

    /// The device actively refused the connection.
    #[error("connection refused")]
    Refused,

    /// No session is established (not connected, or the authenticated
    /// session mode requires a handshake that has not happened).
    #[error("session not established")]
    SessionNotEstablished,

    /// Underlying socket failure.
    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Semantic validation failures raised before any device IO.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// A write attempted a discrete value absent from the discovered
    /// capability set. The device is never sent such a value.
    #[error("{property} value {code} is outside the discovered capability set")]
    UnsupportedValue {
        /// Property the value belongs to (e.g. `"fan_speed"`).
        property: &'static str,
        /// The rejected wire code.
        code: u8,
    },

    /// Target temperature outside the device-reported range.
    #[error("target temperature {value} is outside {min}..={max}")]
    TemperatureOutOfRange { value: f32, min: f32, max: f32 },

    /// A capability set with no operational modes; every unit supports at
    /// least one operating mode, so this means discovery went wrong.
    #[error("device reported no operational modes")]
    EmptyOperationalModes,

    /// A credential field that is not valid hexadecimal.
    #[error("{field} is not a valid hex string")]
    InvalidHex {
        /// Field name (`"token"` or `"key"`).
        field: &'static str,
    },
}
