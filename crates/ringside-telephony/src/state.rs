//! Telephony state values as delivered by the platform.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Platform string for a ringing phone.
pub const EXTRA_STATE_RINGING: &str = "RINGING";
/// Platform string for a connected (off-hook) call.
pub const EXTRA_STATE_OFFHOOK: &str = "OFFHOOK";
/// Platform string for no call.
pub const EXTRA_STATE_IDLE: &str = "IDLE";

/// The call status reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TelephonyState {
    Ringing,
    OffHook,
    Idle,
}

impl TelephonyState {
    /// The exact string the platform uses for this state.
    pub const fn as_platform_str(self) -> &'static str {
        match self {
            TelephonyState::Ringing => EXTRA_STATE_RINGING,
            TelephonyState::OffHook => EXTRA_STATE_OFFHOOK,
            TelephonyState::Idle => EXTRA_STATE_IDLE,
        }
    }
}

impl fmt::Display for TelephonyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_platform_str())
    }
}

/// A state string the platform sent that is not one of the known constants.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized phone state: {0:?}")]
pub struct UnrecognizedState(pub String);

impl FromStr for TelephonyState {
    type Err = UnrecognizedState;

    /// Matching is exact: "ringing" is not a recognized state.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            EXTRA_STATE_RINGING => Ok(TelephonyState::Ringing),
            EXTRA_STATE_OFFHOOK => Ok(TelephonyState::OffHook),
            EXTRA_STATE_IDLE => Ok(TelephonyState::Idle),
            other => Err(UnrecognizedState(other.to_string())),
        }
    }
}

/// A phone state change notification. The platform may omit the state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateNotification {
    pub state: Option<String>,
}

impl StateNotification {
    pub fn new(state: impl Into<String>) -> Self {
        Self {
            state: Some(state.into()),
        }
    }

    /// A notification without a state value.
    pub fn empty() -> Self {
        Self::default()
    }
}

impl From<TelephonyState> for StateNotification {
    fn from(state: TelephonyState) -> Self {
        Self::new(state.as_platform_str())
    }
}
