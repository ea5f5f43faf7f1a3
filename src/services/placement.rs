use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::Result;
use crate::events::{WindowHandle, WorkspaceId, WorkspaceTarget};
use crate::services::window_manager::WindowManager;
use crate::utils::MarkerFile;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Команда размещения окна оверлея
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementCommand {
    /// Перенести на рабочий стол и закрепить
    Show(WorkspaceId),
    /// Убрать на scratch-стол
    Hide,
}

/// Выполняет команды размещения по очереди, вне задачи координатора.
/// Ошибки логируются и не повторяются.
pub struct PlacementWorker {
    window_manager: Arc<dyn WindowManager>,
    identifier: String,
    scratch: WorkspaceTarget,
    marker: MarkerFile,
    handle: Option<WindowHandle>,
    commands: mpsc::Receiver<PlacementCommand>,
}

impl PlacementWorker {
    pub fn new(
        config: &Config,
        window_manager: Arc<dyn WindowManager>,
        commands: mpsc::Receiver<PlacementCommand>,
    ) -> Self {
        Self {
            window_manager,
            identifier: config.poller.overlay_identifier.clone(),
            scratch: WorkspaceTarget::Named(config.window_manager.scratch_workspace.clone()),
            marker: MarkerFile::new(&config.window_manager.marker_file),
            handle: None,
            commands,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        info!("PlacementWorker запущен");
        while let Some(command) = self.commands.recv().await {
            self.execute(command).await;
        }
        info!("PlacementWorker остановлен");
        Ok(())
    }

    pub async fn execute(&mut self, command: PlacementCommand) {
        let Some(handle) = self.resolve_handle().await else {
            debug_if_enabled!("Окно оверлея ещё не найдено, пропускаем {:?}", command);
            return;
        };

        match command {
            PlacementCommand::Show(workspace) => {
                let target = WorkspaceTarget::Id(workspace);
                if let Err(e) = self.window_manager.move_window(&target, &handle).await {
                    warn!("Не удалось перенести оверлей на стол {}: {}", workspace, e);
                }
                if let Err(e) = self.ensure_pinned(&handle).await {
                    warn!("Не удалось закрепить оверлей: {}", e);
                }
            }
            PlacementCommand::Hide => {
                if let Err(e) = self.window_manager.move_window(&self.scratch, &handle).await {
                    warn!("Не удалось убрать оверлей на {}: {}", self.scratch, e);
                }
            }
        }
    }

    /// Адрес окна определяется один раз, после первого показа, и сохраняется в файл-метку
    async fn resolve_handle(&mut self) -> Option<WindowHandle> {
        if let Some(handle) = &self.handle {
            return Some(handle.clone());
        }

        let clients = match self.window_manager.clients().await {
            Ok(clients) => clients,
            Err(e) => {
                warn!("Не удалось найти окно оверлея: {}", e);
                return None;
            }
        };

        let handle = clients
            .into_iter()
            .find(|client| client.is_overlay(&self.identifier))
            .map(|client| client.address)?;

        info!("Адрес окна оверлея: {}", handle);
        if let Err(e) = self.marker.write(&handle) {
            warn!("Не удалось записать {:?}: {}", self.marker.path(), e);
        }
        self.handle = Some(handle.clone());
        Some(handle)
    }

    /// `pin` в Hyprland переключает состояние, поэтому отправляется только незакреплённому окну
    async fn ensure_pinned(&self, handle: &WindowHandle) -> Result<()> {
        let clients = self.window_manager.clients().await?;
        let already_pinned = clients
            .iter()
            .any(|client| &client.address == handle && client.pinned);
        if already_pinned {
            return Ok(());
        }
        self.window_manager.pin_window(handle).await
    }
}
