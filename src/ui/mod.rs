//! Terminal User Interface module.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling per focus context
//! - `events` - Background task event processing
//! - `helpers` - Task spawning and link opening
//! - `render` - Render dispatch
//! - `header`, `partners`, `pages`, `gate`, `notifications`, `status`,
//!   `help` - Widgets

mod events;
mod gate;
mod header;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod notifications;
mod pages;
mod partners;
mod render;
mod status;

pub use loop_runner::{run, Action};
