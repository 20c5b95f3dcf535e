//! A capturer that produces blank frames on a timer. Useful when a video
//! call API insists on a camera but no real video should be sent.
//!
//! Each source owns a single-threaded worker runtime, built on the first
//! `start_capture`. There is at most one timer per source: starting while
//! capturing does nothing. Stopping cancels the timer without waiting for a
//! tick that is already running.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::runtime::Runtime;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
    CaptureError, CaptureState, CapturerObserver, I420Buffer, Result, VideoCapturer, VideoFrame,
    monotonic_nanos,
};

const WORKER_THREAD_NAME: &str = "synthetic-capture";

pub struct SyntheticFrameSource {
    observer: Option<Arc<dyn CapturerObserver>>,
    runtime: Option<Runtime>,
    // Presence of the token means a timer was started and not yet stopped.
    timer: Option<CancellationToken>,
    state: CaptureState,
}

impl SyntheticFrameSource {
    pub fn new() -> Self {
        Self {
            observer: None,
            runtime: None,
            timer: None,
            state: CaptureState::Uninitialized,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Returns the worker runtime, building it on first use.
    fn worker(&mut self) -> Result<&Runtime> {
        let runtime = match self.runtime.take() {
            Some(runtime) => runtime,
            None => {
                debug!("starting synthetic capture worker");
                tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(1)
                    .thread_name(WORKER_THREAD_NAME)
                    .enable_time()
                    .build()?
            }
        };
        Ok(self.runtime.insert(runtime))
    }
}

impl Default for SyntheticFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoCapturer for SyntheticFrameSource {
    fn initialize(&mut self, observer: Arc<dyn CapturerObserver>) -> Result<()> {
        if self.observer.is_some() {
            return Err(CaptureError::AlreadyInitialized);
        }
        self.observer = Some(observer);
        self.state = CaptureState::Initialized;
        Ok(())
    }

    fn start_capture(&mut self, width: u32, height: u32, framerate: u32) -> Result<()> {
        if self.timer.is_some() {
            debug!("synthetic capture already running");
            return Ok(());
        }
        let observer = self.observer.clone().ok_or(CaptureError::NotInitialized)?;
        if width == 0
            || height == 0
            || framerate == 0
            || I420Buffer::byte_len(width, height).is_none()
        {
            return Err(CaptureError::InvalidFormat {
                width,
                height,
                framerate,
            });
        }

        let period = frame_period(framerate);
        let cancel = CancellationToken::new();
        self.worker()?
            .spawn(run_timer(observer, width, height, period, cancel.clone()));

        info!(
            width,
            height,
            framerate,
            period_ms = period.as_millis() as u64,
            "synthetic capture started"
        );
        self.timer = Some(cancel);
        self.state = CaptureState::Capturing;
        Ok(())
    }

    fn stop_capture(&mut self) -> Result<()> {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
            self.state = CaptureState::Stopped;
            info!("synthetic capture stopped");
        }
        Ok(())
    }

    fn change_capture_format(&mut self, width: u32, height: u32, framerate: u32) {
        debug!(width, height, framerate, "ignoring capture format change");
    }

    fn dispose(&mut self) {
        debug!("disposing synthetic capturer");
    }

    fn is_screencast(&self) -> bool {
        false
    }
}

impl Drop for SyntheticFrameSource {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        // Don't block on an in-flight tick, and allow dropping from async code.
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

/// Integer milliseconds per frame, never below one.
fn frame_period(framerate: u32) -> Duration {
    Duration::from_millis(u64::from((1000 / framerate).max(1)))
}

async fn run_timer(
    observer: Arc<dyn CapturerObserver>,
    width: u32,
    height: u32,
    period: Duration,
    cancel: CancellationToken,
) {
    // First tick fires immediately. Late ticks are caught up to keep a fixed rate.
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = tick(observer.as_ref(), width, height) {
                    error!(error = ?e, "frame observer failed, synthetic capture timer halted");
                    return;
                }
            }
        }
    }
    debug!("synthetic capture timer cancelled");
}

/// Produce and deliver one blank frame. The frame is dropped as soon as the
/// observer returns.
fn tick(observer: &dyn CapturerObserver, width: u32, height: u32) -> anyhow::Result<()> {
    let buffer = I420Buffer::allocate(width, height)
        .with_context(|| format!("{}x{} frame does not fit in memory", width, height))?;
    let frame = VideoFrame::new(buffer, 0, monotonic_nanos());
    observer.on_frame_captured(&frame)
}

#[cfg(test)]
mod tests {
    use std::thread::sleep;

    use anyhow::bail;
    use parking_lot::Mutex;

    use super::*;

    #[derive(Debug, Clone, Copy)]
    struct Seen {
        width: u32,
        height: u32,
        rotation: u32,
        timestamp_ns: i64,
    }

    #[derive(Default)]
    struct FrameLog {
        frames: Mutex<Vec<Seen>>,
        fail_after: Option<usize>,
    }

    impl FrameLog {
        fn failing_after(n: usize) -> Self {
            Self {
                fail_after: Some(n),
                ..Default::default()
            }
        }

        fn count(&self) -> usize {
            self.frames.lock().len()
        }

        fn seen(&self) -> Vec<Seen> {
            self.frames.lock().clone()
        }
    }

    impl CapturerObserver for FrameLog {
        fn on_frame_captured(&self, frame: &VideoFrame) -> anyhow::Result<()> {
            let mut frames = self.frames.lock();
            if self.fail_after.is_some_and(|n| frames.len() >= n) {
                bail!("observer refused frame");
            }
            frames.push(Seen {
                width: frame.width(),
                height: frame.height(),
                rotation: frame.rotation(),
                timestamp_ns: frame.timestamp_ns(),
            });
            Ok(())
        }
    }

    fn source_with_log() -> (SyntheticFrameSource, Arc<FrameLog>) {
        let log = Arc::new(FrameLog::default());
        let mut source = SyntheticFrameSource::new();
        source.initialize(log.clone()).unwrap();
        (source, log)
    }

    #[test]
    fn test_frame_period() {
        assert_eq!(frame_period(10), Duration::from_millis(100));
        assert_eq!(frame_period(30), Duration::from_millis(33));
        assert_eq!(frame_period(5000), Duration::from_millis(1));
    }

    #[test]
    fn test_lifecycle_states() {
        let mut source = SyntheticFrameSource::new();
        assert_eq!(source.state(), CaptureState::Uninitialized);
        assert!(!source.is_screencast());

        source.initialize(Arc::new(FrameLog::default())).unwrap();
        assert_eq!(source.state(), CaptureState::Initialized);

        source.start_capture(16, 16, 20).unwrap();
        assert_eq!(source.state(), CaptureState::Capturing);

        source.stop_capture().unwrap();
        assert_eq!(source.state(), CaptureState::Stopped);

        source.dispose();
    }

    #[test]
    fn test_start_requires_observer() {
        let mut source = SyntheticFrameSource::new();
        assert!(matches!(
            source.start_capture(320, 240, 10),
            Err(CaptureError::NotInitialized)
        ));
        assert_eq!(source.state(), CaptureState::Uninitialized);
    }

    #[test]
    fn test_single_observer_per_session() {
        let (mut source, _log) = source_with_log();
        assert!(matches!(
            source.initialize(Arc::new(FrameLog::default())),
            Err(CaptureError::AlreadyInitialized)
        ));
    }

    #[test]
    fn test_invalid_format_rejected() {
        let (mut source, _log) = source_with_log();
        for (w, h, fps) in [(0, 240, 10), (320, 0, 10), (320, 240, 0)] {
            assert!(matches!(
                source.start_capture(w, h, fps),
                Err(CaptureError::InvalidFormat { .. })
            ));
        }
        assert_eq!(source.state(), CaptureState::Initialized);
    }

    #[test]
    fn test_oversized_format_rejected() {
        let (mut source, log) = source_with_log();
        assert!(matches!(
            source.start_capture(u32::MAX, u32::MAX, 10),
            Err(CaptureError::InvalidFormat { .. })
        ));
        assert_eq!(source.state(), CaptureState::Initialized);
        assert_eq!(log.count(), 0);
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let (mut source, log) = source_with_log();
        source.stop_capture().unwrap();
        source.stop_capture().unwrap();
        assert_eq!(source.state(), CaptureState::Initialized);
        assert_eq!(log.count(), 0);
    }

    #[test]
    fn test_frames_delivered_at_rate() {
        let (mut source, log) = source_with_log();
        source.start_capture(320, 240, 10).unwrap();
        sleep(Duration::from_millis(1100));
        source.stop_capture().unwrap();

        let seen = log.seen();
        assert!(seen.len() >= 10, "only {} frames", seen.len());
        for frame in &seen {
            assert_eq!(frame.width, 320);
            assert_eq!(frame.height, 240);
            assert_eq!(frame.rotation, 0);
        }
        for pair in seen.windows(2) {
            assert!(pair[1].timestamp_ns > pair[0].timestamp_ns);
        }
    }

    #[test]
    fn test_first_frame_is_immediate() {
        let (mut source, log) = source_with_log();
        source.start_capture(8, 8, 1).unwrap();
        sleep(Duration::from_millis(300));
        assert_eq!(log.count(), 1);
    }

    #[test]
    fn test_double_start_keeps_one_timer() {
        let (mut source, log) = source_with_log();
        source.start_capture(32, 32, 10).unwrap();
        source.start_capture(64, 64, 10).unwrap();
        sleep(Duration::from_millis(1050));
        source.stop_capture().unwrap();

        let seen = log.seen();
        // One timer gives ~11 frames, two would give ~22.
        assert!(seen.len() >= 10, "{} frames", seen.len());
        assert!(seen.len() <= 13, "{} frames", seen.len());
        assert!(seen.iter().all(|f| f.width == 32));
    }

    #[test]
    fn test_no_frames_after_stop() {
        let (mut source, log) = source_with_log();
        source.start_capture(32, 32, 50).unwrap();
        sleep(Duration::from_millis(200));
        source.stop_capture().unwrap();

        // Let a tick that was already running finish.
        sleep(Duration::from_millis(20));
        let stopped_at = log.count();
        assert!(stopped_at > 0);

        sleep(Duration::from_millis(40));
        assert_eq!(log.count(), stopped_at);
    }

    #[test]
    fn test_restart_after_stop() {
        let (mut source, log) = source_with_log();
        source.start_capture(32, 32, 50).unwrap();
        sleep(Duration::from_millis(100));
        source.stop_capture().unwrap();
        sleep(Duration::from_millis(40));
        let before = log.count();

        source.start_capture(32, 32, 50).unwrap();
        assert_eq!(source.state(), CaptureState::Capturing);
        sleep(Duration::from_millis(100));
        source.stop_capture().unwrap();
        assert!(log.count() > before);
    }

    #[test]
    fn test_change_capture_format_is_inert() {
        let (mut source, log) = source_with_log();
        source.start_capture(320, 240, 10).unwrap();
        source.change_capture_format(640, 480, 60);
        assert_eq!(source.state(), CaptureState::Capturing);
        sleep(Duration::from_millis(1050));
        source.stop_capture().unwrap();

        let seen = log.seen();
        assert!(seen.len() >= 10, "{} frames", seen.len());
        assert!(seen.len() <= 13, "{} frames", seen.len());
        assert!(seen.iter().all(|f| f.width == 320 && f.height == 240));
    }

    #[test]
    fn test_observer_error_halts_timer() {
        let log = Arc::new(FrameLog::failing_after(3));
        let mut source = SyntheticFrameSource::new();
        source.initialize(log.clone()).unwrap();
        source.start_capture(16, 16, 50).unwrap();
        sleep(Duration::from_millis(300));

        assert_eq!(log.count(), 3);
        // The session still counts as capturing until stopped.
        assert_eq!(source.state(), CaptureState::Capturing);
        source.stop_capture().unwrap();
    }

    #[test]
    fn test_drop_while_capturing() {
        let (mut source, log) = source_with_log();
        source.start_capture(16, 16, 50).unwrap();
        sleep(Duration::from_millis(60));
        drop(source);
        sleep(Duration::from_millis(20));
        let after_drop = log.count();
        sleep(Duration::from_millis(60));
        assert_eq!(log.count(), after_drop);
    }

    #[test]
    fn test_usable_as_trait_object() {
        let log = Arc::new(FrameLog::default());
        let mut capturer: Box<dyn VideoCapturer> = Box::new(SyntheticFrameSource::default());
        capturer.initialize(log.clone()).unwrap();
        capturer.start_capture(4, 4, 100).unwrap();
        sleep(Duration::from_millis(50));
        capturer.stop_capture().unwrap();
        assert!(log.count() > 0);
    }
}
