//! Tracks whether the user is on a phone call by following the bus.

use tokio::runtime::Handle;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{AppEvent, EventBus};

/// Follows `incomingCall` / `endCall` on the bus and exposes the resulting
/// in-call flag. The listener task is aborted when this is dropped.
pub struct CallPresence {
    in_call: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

impl CallPresence {
    /// Subscribe to the bus and start listening on the given runtime. Events
    /// posted after this returns are never missed.
    pub fn spawn(bus: &EventBus, handle: &Handle) -> Self {
        let mut events = bus.subscribe();
        let (sender, in_call) = watch::channel(false);

        let task = handle.spawn(async move {
            loop {
                let event = match events.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "call presence fell behind the event bus");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };

                let now = event == AppEvent::IncomingCall;
                let changed = sender.send_if_modified(|current| {
                    let changed = *current != now;
                    *current = now;
                    changed
                });
                if changed {
                    info!(in_call = now, "call presence changed");
                }
            }
            debug!("event bus closed, call presence stopped");
        });

        Self { in_call, task }
    }

    pub fn is_in_call(&self) -> bool {
        *self.in_call.borrow()
    }

    /// A receiver that is notified whenever the in-call flag flips.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.in_call.clone()
    }

    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for CallPresence {
    fn drop(&mut self) {
        self.task.abort();
    }
}
