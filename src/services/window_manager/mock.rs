use crate::error::{OverlayError, Result};
use crate::events::{ClientInfo, WindowHandle, WorkspaceId, WorkspaceTarget};
use parking_lot::Mutex;

use super::r#trait::WindowManager;

/// Управляемый из тестов оконный менеджер, записывающий все команды
#[derive(Default)]
pub struct MockWindowManager {
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    active: Option<i32>,
    clients: Option<Vec<ClientInfo>>,
    fail_dispatch: bool,
    calls: Vec<String>,
}

impl MockWindowManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// None означает ошибку запроса
    pub fn set_active(&self, workspace: Option<i32>) {
        self.state.lock().active = workspace;
    }

    /// None означает ошибку запроса
    pub fn set_clients(&self, clients: Option<Vec<ClientInfo>>) {
        self.state.lock().clients = clients;
    }

    pub fn set_fail_dispatch(&self, fail: bool) {
        self.state.lock().fail_dispatch = fail;
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().calls.clone()
    }

    pub fn dispatches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("move") || c.starts_with("pin"))
            .collect()
    }
}

#[async_trait::async_trait]
impl WindowManager for MockWindowManager {
    async fn active_workspace(&self) -> Result<WorkspaceId> {
        let mut state = self.state.lock();
        state.calls.push("active".to_string());
        state
            .active
            .map(WorkspaceId)
            .ok_or_else(|| OverlayError::Timeout("activeworkspace".to_string()))
    }

    async fn clients(&self) -> Result<Vec<ClientInfo>> {
        let mut state = self.state.lock();
        state.calls.push("clients".to_string());
        state
            .clients
            .clone()
            .ok_or_else(|| OverlayError::Timeout("clients".to_string()))
    }

    async fn move_window(&self, target: &WorkspaceTarget, handle: &WindowHandle) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(format!("move {} {}", target, handle));
        if state.fail_dispatch {
            return Err(OverlayError::command_failed("hyprctl", "exit status: 1", b"boom"));
        }
        Ok(())
    }

    async fn pin_window(&self, handle: &WindowHandle) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(format!("pin {}", handle));
        if state.fail_dispatch {
            return Err(OverlayError::command_failed("hyprctl", "exit status: 1", b"boom"));
        }
        if let Some(clients) = state.clients.as_mut() {
            for client in clients.iter_mut().filter(|c| &c.address == handle) {
                client.pinned = !client.pinned;
            }
        }
        Ok(())
    }
}
