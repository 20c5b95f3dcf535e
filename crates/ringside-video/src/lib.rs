//! Video capture abstraction for ringside.
//!
//! This crate provides a trait-based capturer interface matching what a
//! real-time video pipeline expects from a camera, plus a synthetic source
//! that feeds blank frames when no camera should be used.

mod frame;
mod synthetic;

use std::sync::Arc;

pub use frame::{I420Buffer, VideoFrame, monotonic_nanos};
pub use synthetic::SyntheticFrameSource;
use thiserror::Error;

/// Errors that can occur while driving a capturer.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capturer has no observer, call initialize first")]
    NotInitialized,

    #[error("capturer already has an observer")]
    AlreadyInitialized,

    #[error("invalid capture format {width}x{height}@{framerate}")]
    InvalidFormat {
        width: u32,
        height: u32,
        framerate: u32,
    },

    #[error("failed to start capture worker: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Result type for capture operations.
pub type Result<T> = std::result::Result<T, CaptureError>;

/// Lifecycle of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    /// No observer registered yet
    Uninitialized,
    /// Observer registered, never started
    Initialized,
    /// Frames are being produced
    Capturing,
    /// Capture was stopped and may be started again
    Stopped,
}

/// Receives frames produced by a capturer.
pub trait CapturerObserver: Send + Sync {
    /// Called on the capture worker for every frame. The frame is only
    /// borrowed for the duration of the call; clone it to keep it.
    ///
    /// Returning an error stops the capturer's timer.
    fn on_frame_captured(&self, frame: &VideoFrame) -> anyhow::Result<()>;
}

/// A pluggable video source.
///
/// Implement this trait to feed a video pipeline from something other than
/// a camera. State changes take `&mut self`, so callers serialize them.
pub trait VideoCapturer: Send {
    /// Register the observer that receives frames. Must happen before
    /// `start_capture`.
    fn initialize(&mut self, observer: Arc<dyn CapturerObserver>) -> Result<()>;

    /// Start producing frames. Starting an active capturer does nothing.
    fn start_capture(&mut self, width: u32, height: u32, framerate: u32) -> Result<()>;

    /// Stop producing frames. Stopping an idle capturer does nothing.
    fn stop_capture(&mut self) -> Result<()>;

    fn change_capture_format(&mut self, width: u32, height: u32, framerate: u32);

    /// Release held resources.
    fn dispose(&mut self);

    fn is_screencast(&self) -> bool;
}
