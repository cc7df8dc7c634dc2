//! Terminal UI module using ratatui.
//!
//! - `render`: Main frame rendering, layout and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Color schemes and text styling
//! - `users`: User list and detail panels

pub mod input;
pub mod render;
pub mod styles;
pub mod users;
