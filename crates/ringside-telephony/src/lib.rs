//! Phone call state handling for ringside.
//!
//! The host platform delivers [`StateNotification`]s to a
//! [`NotificationHandler`]. [`CallStateMonitor`] is the handler that turns
//! them into `incomingCall` / `endCall` events on the shared bus.

mod monitor;
mod state;

pub use monitor::{CallStateMonitor, NotificationHandler};
pub use state::{
    EXTRA_STATE_IDLE, EXTRA_STATE_OFFHOOK, EXTRA_STATE_RINGING, StateNotification, TelephonyState,
    UnrecognizedState,
};
use thiserror::Error;

/// Errors raised while handling a phone state notification.
#[derive(Debug, Error)]
pub enum TelephonyError {
    #[error("phone state notification carried no state")]
    MissingState,
}

/// Result type for telephony operations.
pub type Result<T> = std::result::Result<T, TelephonyError>;
