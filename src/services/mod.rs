//! Automation backend module
//!
//! Service calls the card sends, the backend trait they go through and an
//! in-process backend that keeps timer entities in memory.

pub mod backend;
pub mod commands;

// Re-export main types
pub use backend::{BackendError, LocalTimerBackend, TimerBackend};
pub use commands::{ServiceCall, ServiceData, TimerService, TIMER_DOMAIN};
