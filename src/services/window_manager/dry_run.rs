use crate::error::Result;
use crate::events::{ClientInfo, WindowHandle, WorkspaceId, WorkspaceTarget};
use parking_lot::Mutex;
use tracing::info;

use super::r#trait::WindowManager;

/// Сколько опросов длится каждый шаг сценария (при 500мс это ~10 секунд)
const POLLS_PER_STEP: usize = 20;

/// (рабочий стол, есть ли на нём чужие окна)
const SCENARIO: [(i32, bool); 5] = [(1, false), (1, true), (2, true), (2, false), (3, false)];

const OVERLAY_ADDRESS: &str = "0xdryrun";

/// Эмуляция оконного менеджера: прокручивает заранее заданный сценарий
pub struct DryRunWindowManager {
    identifier: String,
    polls: Mutex<usize>,
}

impl DryRunWindowManager {
    pub fn new(identifier: String) -> Self {
        info!("Dry-run режим - оконный менеджер эмулируется");
        Self {
            identifier,
            polls: Mutex::new(0),
        }
    }

    fn current_step(&self) -> (i32, bool) {
        let polls = *self.polls.lock();
        SCENARIO[(polls / POLLS_PER_STEP) % SCENARIO.len()]
    }
}

#[async_trait::async_trait]
impl WindowManager for DryRunWindowManager {
    async fn active_workspace(&self) -> Result<WorkspaceId> {
        // Один опрос начинается с запроса активного стола
        *self.polls.lock() += 1;
        Ok(WorkspaceId(self.current_step().0))
    }

    async fn clients(&self) -> Result<Vec<ClientInfo>> {
        let (workspace, occupied) = self.current_step();

        let mut clients = vec![ClientInfo::new(OVERLAY_ADDRESS, workspace).with_class(&self.identifier)];
        if occupied {
            clients.push(
                ClientInfo::new("0xdryterm", workspace)
                    .with_class("Terminal")
                    .with_title("Terminal - dry_run"),
            );
        }
        Ok(clients)
    }

    async fn move_window(&self, target: &WorkspaceTarget, handle: &WindowHandle) -> Result<()> {
        info!("[DRY RUN] movetoworkspacesilent {},address:{}", target, handle);
        Ok(())
    }

    async fn pin_window(&self, handle: &WindowHandle) -> Result<()> {
        info!("[DRY RUN] pin address:{}", handle);
        Ok(())
    }
}
