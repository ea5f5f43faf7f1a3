pub mod clipboard;
pub mod coordinator;
pub mod overlay;
pub mod placement;
pub mod quote_store;
pub mod timer;
pub mod user_input;
pub mod window_manager;
pub mod workspace_poller;

pub use clipboard::create_clipboard;
pub use coordinator::Coordinator;
pub use overlay::TerminalSurface;
pub use placement::PlacementWorker;
pub use quote_store::QuoteStore;
pub use window_manager::create_window_manager;
pub use workspace_poller::WorkspacePoller;
