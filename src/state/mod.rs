//! State management module
//!
//! Backend entity records, the card display state and the shared host state.

pub mod app_state;
pub mod card;
pub mod entity;

// Re-export main types
pub use app_state::{AppError, AppState};
pub use card::{CardConfig, CardState, CardView, DisplayStatus, CARD_SIZE};
pub use entity::{TimerAttributes, TimerEntity, TimerStatus};
