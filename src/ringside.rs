//! Stand-in for the host platform. Reads phone states from stdin, one per
//! line (an empty line is a notification without a state), and pauses the
//! synthetic camera while a call is active.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use parking_lot::Mutex;
use ringside::presence::CallPresence;
use ringside::{
    CallStateMonitor, CaptureConfig, CapturerObserver, ConfigManager, DEFAULT_LOG_LEVEL, EventBus,
    NotificationHandler, StateNotification, SyntheticFrameSource, VERSION, VideoCapturer,
    VideoFrame,
};
use tokio::sync::watch;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// Counts delivered frames, logging roughly once per second of video.
struct FrameCounter {
    frames: AtomicU64,
    log_every: u64,
}

impl FrameCounter {
    fn new(framerate: u32) -> Self {
        Self {
            frames: AtomicU64::new(0),
            log_every: u64::from(framerate.max(1)),
        }
    }

    fn total(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }
}

impl CapturerObserver for FrameCounter {
    fn on_frame_captured(&self, frame: &VideoFrame) -> anyhow::Result<()> {
        let total = self.frames.fetch_add(1, Ordering::Relaxed) + 1;
        if total % self.log_every == 0 {
            debug!(
                total,
                width = frame.width(),
                height = frame.height(),
                timestamp_ns = frame.timestamp_ns(),
                "synthetic frames delivered"
            );
        }
        Ok(())
    }
}

fn main() -> Result<()> {
    // Load config
    let config_manager = ConfigManager::new()?;
    let config = config_manager.load()?;
    // save back the config to create the file if it doesn't exist
    config_manager.save(&config)?;

    // Initialize the logger
    let default_level = config.log_level().unwrap_or(DEFAULT_LOG_LEVEL).to_owned();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("RINGSIDE_LOG")
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    info!(version = VERSION, config_path = ?config_manager.config_path(), "ringside starting");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()?;

    let bus = EventBus::new(config.bus_capacity());
    let monitor = CallStateMonitor::new(Arc::new(bus.clone()));
    let presence = CallPresence::spawn(&bus, runtime.handle());

    let capture = config.capture;
    let counter = Arc::new(FrameCounter::new(capture.framerate));
    let mut camera = SyntheticFrameSource::new();
    camera.initialize(counter.clone())?;
    camera
        .start_capture(capture.width, capture.height, capture.framerate)
        .context("Failed to start synthetic camera")?;
    let camera = Arc::new(Mutex::new(camera));

    runtime.spawn(follow_calls(presence.subscribe(), camera.clone(), capture));

    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read phone state from stdin")?;
        let raw = line.trim();
        let notification = if raw.is_empty() {
            StateNotification::empty()
        } else {
            StateNotification::new(raw)
        };

        match monitor.on_notification(&notification) {
            Ok(Some(event)) => info!(event = %event, "event posted"),
            Ok(None) => {}
            Err(e) => error!("Failed to handle phone state: {}", e),
        }
    }

    camera.lock().stop_capture()?;
    info!(
        frames = counter.total(),
        in_call = presence.is_in_call(),
        "input closed, shutting down"
    );
    presence.shutdown();

    Ok(())
}

/// Stop the camera while on a call and resume it afterwards.
async fn follow_calls(
    mut in_call: watch::Receiver<bool>,
    camera: Arc<Mutex<SyntheticFrameSource>>,
    capture: CaptureConfig,
) {
    while in_call.changed().await.is_ok() {
        let on_call = *in_call.borrow_and_update();
        let mut camera = camera.lock();
        let result = if on_call {
            camera.stop_capture()
        } else {
            camera.start_capture(capture.width, capture.height, capture.framerate)
        };
        match result {
            Ok(()) => info!(on_call, state = ?camera.state(), "camera updated"),
            Err(e) => error!("Failed to update camera: {}", e),
        }
    }
}
