//! WindowManager capability: responsibility and boundaries
//!
//! This module is responsible ONLY for talking to the window manager: querying the active
//! workspace and the client list, and dispatching move/pin commands for a window handle.
//! It MUST NOT decide anything about overlay visibility; occupancy and edge detection live in
//! the workspace poller, and show/hide decisions in the coordinator.

mod dry_run;
mod hyprland;
#[cfg(test)]
pub mod mock;
mod r#trait;

pub use self::r#trait::{create_window_manager, WindowManager};
