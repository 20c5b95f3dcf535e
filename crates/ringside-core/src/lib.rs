//! Core types and configuration for ringside.
//!
//! This crate provides the event bus and settings shared by the telephony
//! and video sub-crates.

mod config;
mod event;

pub use config::{CaptureConfig, Config, ConfigManager, DEFAULT_BUS_CAPACITY};
pub use event::{AppEvent, EventBus, EventSink, UnknownEvent};

/// Application name
pub const APP_NAME: &str = "ringside";

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";
