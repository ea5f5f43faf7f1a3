use crate::config::Config;
use crate::error::Result;
use crate::events::{ClientInfo, WindowHandle, WorkspaceId, WorkspaceTarget};
use std::sync::Arc;

/// Capability interface over the window manager: one method per action, failures are values
#[async_trait::async_trait]
pub trait WindowManager: Send + Sync {
    /// Активный рабочий стол
    async fn active_workspace(&self) -> Result<WorkspaceId>;

    /// Все клиенты (окна) оконного менеджера
    async fn clients(&self) -> Result<Vec<ClientInfo>>;

    /// Тихо перенести окно на рабочий стол, не переключая фокус
    async fn move_window(&self, target: &WorkspaceTarget, handle: &WindowHandle) -> Result<()>;

    /// Переключить закрепление окна (pin действует на всех рабочих столах)
    async fn pin_window(&self, handle: &WindowHandle) -> Result<()>;
}

/// Factory function to create an appropriate window manager based on the dry_run flag
pub fn create_window_manager(config: Arc<Config>, dry_run: bool) -> Arc<dyn WindowManager> {
    if dry_run {
        Arc::new(super::dry_run::DryRunWindowManager::new(
            config.poller.overlay_identifier.clone(),
        ))
    } else {
        Arc::new(super::hyprland::HyprlandClient::new(
            config.window_manager.command.clone(),
            config.wm_timeout(),
        ))
    }
}
