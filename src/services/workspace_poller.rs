use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::Result;
use crate::events::{OverlayEvent, VisibilityEvent, WorkspaceId, WorkspaceSnapshot};
use crate::services::window_manager::WindowManager;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{info, warn};

/// Превращает опрос уровня в события по фронту: сообщает только об изменении пары
/// (рабочий стол, занятость). Первое наблюдение сообщается всегда.
#[derive(Debug, Default)]
pub struct EdgeDetector {
    last: Option<WorkspaceSnapshot>,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Возвращает `Some(should_show)` на переходе, `None` если ничего не изменилось
    pub fn observe(&mut self, snapshot: WorkspaceSnapshot) -> Option<bool> {
        if self.last == Some(snapshot) {
            return None;
        }
        self.last = Some(snapshot);
        Some(!snapshot.occupied)
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<WorkspaceSnapshot> {
        self.last
    }
}

/// Фоновый опрос оконного менеджера. Только читает внешнее состояние и отправляет события
/// координатору; ничего общего не изменяет.
pub struct WorkspacePoller {
    window_manager: Arc<dyn WindowManager>,
    identifier: String,
    interval: Duration,
    active: Arc<AtomicBool>,
    events: mpsc::Sender<OverlayEvent>,
    detector: EdgeDetector,
}

impl WorkspacePoller {
    pub fn new(
        config: &Config,
        window_manager: Arc<dyn WindowManager>,
        active: Arc<AtomicBool>,
        events: mpsc::Sender<OverlayEvent>,
    ) -> Self {
        info!(
            "Инициализация WorkspacePoller (интервал: {}мс, идентификатор: '{}')",
            config.poller.interval_ms, config.poller.overlay_identifier
        );

        Self {
            window_manager,
            identifier: config.poller.overlay_identifier.clone(),
            interval: config.poll_interval(),
            active,
            events,
            detector: EdgeDetector::new(),
        }
    }

    pub async fn run(mut self) -> Result<()> {
        info!("WorkspacePoller запущен");

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while self.active.load(Ordering::Relaxed) {
            ticker.tick().await;

            let snapshot = self.snapshot().await;
            if let Some(should_show) = self.detector.observe(snapshot) {
                let event = VisibilityEvent::new(snapshot.workspace, should_show);
                debug_if_enabled!("Переход состояния рабочего стола: {}", event);

                if self.events.send(event.into()).await.is_err() {
                    info!("Координатор больше не принимает события, опрос остановлен");
                    return Ok(());
                }
            }
        }

        info!("WorkspacePoller остановлен");
        Ok(())
    }

    /// Один опрос. Ошибки не прерывают цикл: стол по умолчанию 1, занятость по умолчанию true
    pub async fn snapshot(&self) -> WorkspaceSnapshot {
        let workspace = match self.window_manager.active_workspace().await {
            Ok(workspace) => workspace,
            Err(e) => {
                warn!("Не удалось получить активный рабочий стол: {}", e);
                WorkspaceId::FALLBACK
            }
        };

        let occupied = match self.window_manager.clients().await {
            Ok(clients) => clients
                .iter()
                .any(|client| client.occupies(workspace, &self.identifier)),
            Err(e) => {
                warn!("Не удалось получить список окон: {}", e);
                true
            }
        };

        WorkspaceSnapshot {
            workspace,
            occupied,
        }
    }
}
