// Re-export from sub-crates
pub use ringside_core::{
    APP_NAME, AppEvent, CaptureConfig, Config, ConfigManager, DEFAULT_LOG_LEVEL, EventBus,
    EventSink,
};
pub use ringside_telephony::{
    CallStateMonitor, NotificationHandler, StateNotification, TelephonyError, TelephonyState,
};
pub use ringside_video::{
    CaptureError, CaptureState, CapturerObserver, I420Buffer, SyntheticFrameSource,
    VideoCapturer, VideoFrame,
};

// App-specific modules
pub mod presence;

// Version from this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
