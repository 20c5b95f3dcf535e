//! Application events and the bus they travel on.
//!
//! Events are bare names with no payload. Producers only see the
//! [`EventSink`] trait so they can post to any dispatcher, while [`EventBus`]
//! is the in-process broadcast implementation used by the app and tests.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use tokio::sync::broadcast;
use tracing::trace;

use crate::config::DEFAULT_BUS_CAPACITY;

/// Events posted on the shared bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppEvent {
    /// A phone call is ringing or connected
    IncomingCall,
    /// The phone call ended, or there is no call
    EndCall,
}

impl AppEvent {
    /// Name the event is dispatched under.
    pub const fn name(self) -> &'static str {
        match self {
            AppEvent::IncomingCall => "incomingCall",
            AppEvent::EndCall => "endCall",
        }
    }
}

impl fmt::Display for AppEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown event name: {0:?}")]
pub struct UnknownEvent(pub String);

impl FromStr for AppEvent {
    type Err = UnknownEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "incomingCall" => Ok(AppEvent::IncomingCall),
            "endCall" => Ok(AppEvent::EndCall),
            other => Err(UnknownEvent(other.to_string())),
        }
    }
}

/// Anything that accepts posted events. Posting is fire-and-forget.
pub trait EventSink: Send + Sync {
    fn post(&self, event: AppEvent);
}

/// Broadcast event bus. Every subscriber receives every event posted after
/// it subscribed. Clones share the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl EventSink for EventBus {
    fn post(&self, event: AppEvent) {
        // Only fails when nobody is listening.
        if self.sender.send(event).is_err() {
            trace!(event = %event, "event posted with no subscribers");
        }
    }
}
