//! Timer Card - display and control a countdown timer entity on a dashboard
//!
//! The core is the duration engine in [`duration`]: parsing user text,
//! formatting `HH:MM:SS` and computing time left until a deadline. Around it
//! sit the card display state, the service calls sent to the automation
//! backend and a small host service that ticks the countdown.

pub mod config;
pub mod duration;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod server;
pub mod signals;

// Re-export commonly used types
pub use config::Config;
pub use duration::TimerDuration;
pub use state::{AppState, CardConfig, CardState};
pub use api::create_router;
pub use server::serve;
pub use signals::shutdown_signal;
