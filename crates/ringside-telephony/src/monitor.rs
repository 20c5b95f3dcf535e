//! Translates phone state notifications into bus events.

use std::sync::Arc;

use ringside_core::{AppEvent, EventSink};
use tracing::{debug, warn};

use crate::{Result, StateNotification, TelephonyError, TelephonyState};

/// Receives notifications from the platform.
pub trait NotificationHandler: Send + Sync {
    /// Handle one notification. Returns the event that was posted, if any.
    fn on_notification(&self, notification: &StateNotification) -> Result<Option<AppEvent>>;
}

/// Posts `incomingCall` when the phone rings or a call connects, and
/// `endCall` when it goes idle. Keeps no state between notifications, so
/// repeated states produce repeated events.
pub struct CallStateMonitor {
    sink: Arc<dyn EventSink>,
}

impl CallStateMonitor {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self { sink }
    }

    /// The event a state maps to.
    pub fn event_for(state: TelephonyState) -> AppEvent {
        match state {
            TelephonyState::Ringing | TelephonyState::OffHook => AppEvent::IncomingCall,
            TelephonyState::Idle => AppEvent::EndCall,
        }
    }
}

impl NotificationHandler for CallStateMonitor {
    fn on_notification(&self, notification: &StateNotification) -> Result<Option<AppEvent>> {
        let raw = notification
            .state
            .as_deref()
            .ok_or(TelephonyError::MissingState)?;

        let state = match raw.parse::<TelephonyState>() {
            Ok(state) => state,
            Err(e) => {
                warn!("ignoring notification: {}", e);
                return Ok(None);
            }
        };

        let event = Self::event_for(state);
        debug!(state = %state, event = %event, "phone state changed");
        self.sink.post(event);
        Ok(Some(event))
    }
}
