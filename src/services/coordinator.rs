use crate::config::Config;
use crate::debug_if_enabled;
use crate::error::Result;
use crate::events::{OverlayEvent, UserAction, VisibilityEvent, WorkspaceId};
use crate::services::clipboard::Clipboard;
use crate::services::overlay::{OverlaySurface, OverlayView};
use crate::services::placement::PlacementCommand;
use crate::services::quote_store::QuoteStore;
use crate::services::timer::{wait_for_deadline, TimerController};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{info, warn};

/// Состояние оверлея, которое меняет только координатор
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OverlayState {
    pub visible: bool,
    pub paused: bool,
    pub current: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
enum Step {
    Next,
    Previous,
}

impl Step {
    fn label(self) -> &'static str {
        match self {
            Step::Next => "следующую",
            Step::Previous => "предыдущую",
        }
    }
}

/// Единственный владелец изменяемого состояния: видимость, таймер, выбор цитаты.
/// Все события (опрос, таймер, пользователь, результаты копирования) обрабатываются в одной задаче,
/// поэтому блокировки не нужны.
pub struct Coordinator {
    store: QuoteStore,
    timer: TimerController,
    surface: Box<dyn OverlaySurface>,
    clipboard: Arc<dyn Clipboard>,
    placement: mpsc::Sender<PlacementCommand>,
    events: mpsc::Sender<OverlayEvent>,
    state: OverlayState,
}

impl Coordinator {
    pub fn new(
        config: &Config,
        store: QuoteStore,
        surface: Box<dyn OverlaySurface>,
        clipboard: Arc<dyn Clipboard>,
        placement: mpsc::Sender<PlacementCommand>,
        events: mpsc::Sender<OverlayEvent>,
    ) -> Self {
        info!(
            "Инициализация Coordinator ({} цитат, показ по {} c)",
            store.len(),
            config.quotes.display_duration_secs
        );

        Self {
            store,
            timer: TimerController::new(config.display_duration()),
            surface,
            clipboard,
            placement,
            events,
            state: OverlayState::default(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> OverlayState {
        self.state
    }

    #[cfg(test)]
    pub fn timer(&self) -> &TimerController {
        &self.timer
    }

    /// Цикл событий. Завершается по `Shutdown`, по команде `quit` или при закрытии канала.
    pub async fn run(mut self, mut events: mpsc::Receiver<OverlayEvent>) -> Result<()> {
        info!("Coordinator запущен");

        loop {
            let deadline = self.timer.deadline();

            tokio::select! {
                event = events.recv() => match event {
                    None | Some(OverlayEvent::Shutdown) => break,
                    Some(OverlayEvent::User(UserAction::Quit)) => {
                        info!("Получена команда выхода");
                        break;
                    }
                    Some(event) => self.handle_event(event),
                },
                _ = wait_for_deadline(deadline) => self.on_timer_expired(),
            }
        }

        self.shutdown();
        Ok(())
    }

    pub fn handle_event(&mut self, event: OverlayEvent) {
        match event {
            OverlayEvent::VisibilityChanged(event) => self.on_visibility(&event),
            OverlayEvent::User(action) => self.on_user_action(action),
            OverlayEvent::CopyFinished { ok } => self.on_copy_finished(ok),
            OverlayEvent::Shutdown => self.shutdown(),
        }
    }

    fn on_visibility(&mut self, event: &VisibilityEvent) {
        debug_if_enabled!("Событие видимости: {}", event);

        if event.should_show && !self.state.visible {
            self.show_on(event.workspace);
        } else if !event.should_show && self.state.visible {
            self.hide();
        }
    }

    fn show_on(&mut self, workspace: WorkspaceId) {
        let Some(index) = self.store.select_random(self.state.current) else {
            warn!("Нет цитат для показа");
            return;
        };

        self.state.current = Some(index);
        self.state.visible = true;
        self.render();
        self.place(PlacementCommand::Show(workspace));

        if !self.state.paused {
            self.timer.start();
        }
        info!("Показываем оверлей на рабочем столе {} (нет окон)", workspace);
    }

    fn hide(&mut self) {
        self.timer.cancel();
        self.place(PlacementCommand::Hide);
        if let Err(e) = self.surface.hide() {
            warn!("Не удалось скрыть оверлей: {}", e);
        }
        self.state.visible = false;
        info!("Скрываем оверлей (на рабочем столе есть окна)");
    }

    /// Истечение таймера: следующая цитата и новое одноразовое расписание на полный интервал
    pub fn on_timer_expired(&mut self) {
        if !self.timer.fire() {
            return;
        }
        if !self.state.visible || self.state.paused {
            return;
        }
        if self.step(Step::Next) {
            self.timer.start();
        }
    }

    fn on_user_action(&mut self, action: UserAction) {
        match action {
            UserAction::Previous | UserAction::Next => {
                if !self.state.visible {
                    debug_if_enabled!("Оверлей скрыт, навигация игнорируется");
                    return;
                }
                let step = if action == UserAction::Next {
                    Step::Next
                } else {
                    Step::Previous
                };
                if self.step(step) {
                    self.timer.reset();
                    info!("Показываем {} цитату", step.label());
                }
            }
            UserAction::TogglePause => self.toggle_pause(),
            UserAction::Copy => self.copy_current(),
            UserAction::Quit => {}
        }
    }

    fn toggle_pause(&mut self) {
        self.state.paused = !self.state.paused;

        if self.state.paused {
            self.timer.pause();
            info!("Ротация цитат на паузе");
        } else {
            if self.state.visible && !self.timer.resume() {
                // Пауза была нажата, пока оверлей был скрыт: отсчёт не шёл
                self.timer.start();
            }
            match self.timer.remaining_at(Instant::now()) {
                Some(remaining) => info!(
                    "Ротация цитат возобновлена, до смены цитаты {:.1} c",
                    remaining.as_secs_f64()
                ),
                None => info!("Ротация цитат возобновлена"),
            }
        }

        if self.state.visible {
            self.render();
        }
    }

    fn copy_current(&mut self) {
        let quote = match self.state.current.and_then(|index| self.store.get(index)) {
            Some(quote) if self.state.visible => quote,
            _ => {
                debug_if_enabled!("Нечего копировать");
                return;
            }
        };

        let text = quote.clipboard_text();
        let clipboard = Arc::clone(&self.clipboard);
        let events = self.events.clone();

        // Внешняя утилита работает вне цикла координатора, результат приходит событием
        tokio::spawn(async move {
            let ok = match clipboard.copy(&text).await {
                Ok(()) => {
                    info!("Цитата скопирована: {:.50}...", text);
                    true
                }
                Err(e) => {
                    warn!("Не удалось скопировать в буфер обмена: {}", e);
                    false
                }
            };
            let _ = events.send(OverlayEvent::CopyFinished { ok }).await;
        });
    }

    fn on_copy_finished(&mut self, ok: bool) {
        if !self.state.visible {
            return;
        }
        if let Err(e) = self.surface.flash_copy(ok) {
            warn!("Не удалось отрисовать результат копирования: {}", e);
        }
    }

    /// Циклический шаг; на пустом наборе ничего не меняет и возвращает false
    fn step(&mut self, step: Step) -> bool {
        let next = match step {
            Step::Next => self.store.select_next(self.state.current),
            Step::Previous => self.store.select_prev(self.state.current),
        };
        match next {
            Some(index) => {
                self.state.current = Some(index);
                self.render();
                true
            }
            None => false,
        }
    }

    fn render(&mut self) {
        let Some(index) = self.state.current else {
            return;
        };
        let Some(quote) = self.store.get(index) else {
            return;
        };

        let view = OverlayView {
            quote: quote.clone(),
            nav: self.store.nav_state(index),
            paused: self.state.paused,
        };
        if let Err(e) = self.surface.show(&view) {
            warn!("Не удалось отрисовать цитату: {}", e);
        }
    }

    fn place(&self, command: PlacementCommand) {
        if let Err(e) = self.placement.try_send(command) {
            warn!("Команда размещения отброшена: {}", e);
        }
    }

    fn shutdown(&mut self) {
        self.timer.cancel();
        if self.state.visible {
            if let Err(e) = self.surface.hide() {
                warn!("Не удалось скрыть оверлей: {}", e);
            }
            self.state.visible = false;
        }
        info!("Coordinator остановлен");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OverlayError;
    use crate::services::overlay::recording::{Frame, RecordingSurface};
    use crate::services::quote_store::Quote;
    use crate::services::timer::TimerState;
    use parking_lot::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct FakeClipboard {
        fail: bool,
        copied: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl Clipboard for FakeClipboard {
        async fn copy(&self, text: &str) -> Result<()> {
            self.copied.lock().push(text.to_string());
            if self.fail {
                return Err(OverlayError::ToolMissing("wl-copy".to_string()));
            }
            Ok(())
        }
    }

    struct Harness {
        coordinator: Coordinator,
        surface: RecordingSurface,
        clipboard: Arc<FakeClipboard>,
        placement: mpsc::Receiver<PlacementCommand>,
        events: mpsc::Receiver<OverlayEvent>,
        events_tx: mpsc::Sender<OverlayEvent>,
    }

    fn harness(quotes: usize, fail_copy: bool) -> Harness {
        let store = QuoteStore::from_quotes(
            (0..quotes)
                .map(|i| Quote::new(&format!("Author {}", i), &format!("Quote {}", i)))
                .collect(),
        );
        let surface = RecordingSurface::new();
        let clipboard = Arc::new(FakeClipboard {
            fail: fail_copy,
            ..Default::default()
        });
        let (placement_tx, placement) = mpsc::channel(16);
        let (events_tx, events) = mpsc::channel(16);

        let coordinator = Coordinator::new(
            &Config::default(),
            store,
            Box::new(surface.clone()),
            clipboard.clone(),
            placement_tx,
            events_tx.clone(),
        );

        Harness {
            coordinator,
            surface,
            clipboard,
            placement,
            events,
            events_tx,
        }
    }

    fn show(workspace: i32) -> OverlayEvent {
        VisibilityEvent::new(WorkspaceId(workspace), true).into()
    }

    fn hide(workspace: i32) -> OverlayEvent {
        VisibilityEvent::new(WorkspaceId(workspace), false).into()
    }

    #[tokio::test]
    async fn test_show_selects_quote_places_and_starts_timer() {
        let mut h = harness(3, false);
        h.coordinator.handle_event(show(2));

        let state = h.coordinator.state();
        assert!(state.visible);
        assert!(state.current.unwrap() < 3);
        assert!(h.coordinator.timer().is_running());
        assert_eq!(h.placement.try_recv().unwrap(), PlacementCommand::Show(WorkspaceId(2)));

        let view = h.surface.last_shown().unwrap();
        assert_eq!(view.quote.quote, format!("Quote {}", state.current.unwrap()));
    }

    #[tokio::test]
    async fn test_repeated_show_is_ignored() {
        let mut h = harness(3, false);
        h.coordinator.handle_event(show(1));
        h.coordinator.handle_event(show(2));

        assert_eq!(h.surface.frames().len(), 1);
        assert_eq!(h.placement.try_recv().unwrap(), PlacementCommand::Show(WorkspaceId(1)));
        assert!(h.placement.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_hide_cancels_timer_and_parks_window() {
        let mut h = harness(3, false);
        h.coordinator.handle_event(hide(1));
        assert!(h.surface.frames().is_empty());

        h.coordinator.handle_event(show(1));
        h.coordinator.handle_event(hide(1));

        assert!(!h.coordinator.state().visible);
        assert_eq!(h.coordinator.timer().state(), TimerState::Idle);
        assert_eq!(h.surface.frames().last(), Some(&Frame::Hidden));
        assert_eq!(h.placement.try_recv().unwrap(), PlacementCommand::Show(WorkspaceId(1)));
        assert_eq!(h.placement.try_recv().unwrap(), PlacementCommand::Hide);
    }

    #[tokio::test]
    async fn test_reshow_avoids_previous_quote() {
        let mut h = harness(2, false);
        h.coordinator.handle_event(show(1));
        let first = h.coordinator.state().current;
        h.coordinator.handle_event(hide(1));
        h.coordinator.handle_event(show(1));
        assert_ne!(h.coordinator.state().current, first);
    }

    #[tokio::test]
    async fn test_navigation_wraps_and_resets_timer() {
        let mut h = harness(3, false);
        h.coordinator.handle_event(show(1));
        let start = h.coordinator.state().current.unwrap();

        h.coordinator.handle_event(UserAction::Next.into());
        assert_eq!(h.coordinator.state().current, Some((start + 1) % 3));
        h.coordinator.handle_event(UserAction::Previous.into());
        h.coordinator.handle_event(UserAction::Previous.into());
        assert_eq!(h.coordinator.state().current, Some((start + 2) % 3));
        assert!(h.coordinator.timer().is_running());

        let view = h.surface.last_shown().unwrap();
        let index = (start + 2) % 3;
        assert_eq!(view.nav.prev_enabled, index > 0);
        assert_eq!(view.nav.next_enabled, index < 2);
    }

    #[tokio::test]
    async fn test_navigation_while_hidden_is_ignored() {
        let mut h = harness(3, false);
        h.coordinator.handle_event(UserAction::Next.into());
        assert_eq!(h.coordinator.state(), OverlayState::default());
        assert!(h.surface.frames().is_empty());
    }

    #[tokio::test]
    async fn test_empty_store_never_shows() {
        let mut h = harness(0, false);
        h.coordinator.handle_event(show(1));
        assert!(!h.coordinator.state().visible);
        assert!(h.placement.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_and_resume_keep_remaining_time() {
        let mut h = harness(3, false);
        h.coordinator.handle_event(show(1));

        tokio::time::advance(Duration::from_secs(4)).await;
        h.coordinator.handle_event(UserAction::TogglePause.into());
        assert!(h.coordinator.state().paused);
        assert!(h.coordinator.timer().is_paused());
        assert!(h.surface.last_shown().unwrap().paused);

        tokio::time::advance(Duration::from_secs(30)).await;
        h.coordinator.handle_event(UserAction::TogglePause.into());
        let now = tokio::time::Instant::now();
        assert_eq!(h.coordinator.timer().deadline(), Some(now + Duration::from_secs(6)));
    }

    #[tokio::test]
    async fn test_pause_while_hidden_then_show_and_resume() {
        let mut h = harness(3, false);
        h.coordinator.handle_event(UserAction::TogglePause.into());
        assert_eq!(h.coordinator.timer().state(), TimerState::Idle);

        h.coordinator.handle_event(show(1));
        assert_eq!(h.coordinator.timer().state(), TimerState::Idle);

        h.coordinator.handle_event(UserAction::TogglePause.into());
        assert!(h.coordinator.timer().is_running());
    }

    #[tokio::test]
    async fn test_navigation_while_paused_stays_paused() {
        let mut h = harness(3, false);
        h.coordinator.handle_event(show(1));
        h.coordinator.handle_event(UserAction::TogglePause.into());
        h.coordinator.handle_event(UserAction::Next.into());

        assert!(h.coordinator.timer().is_paused());
        assert_eq!(h.coordinator.timer().deadline(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_expiry_advances_and_rearms() {
        let mut h = harness(4, false);
        h.coordinator.handle_event(show(1));
        let start = h.coordinator.state().current.unwrap();

        h.coordinator.on_timer_expired();
        assert_eq!(h.coordinator.state().current, Some(start));

        tokio::time::advance(Duration::from_secs(10)).await;
        h.coordinator.on_timer_expired();
        assert_eq!(h.coordinator.state().current, Some((start + 1) % 4));
        let now = tokio::time::Instant::now();
        assert_eq!(h.coordinator.timer().deadline(), Some(now + Duration::from_secs(10)));
    }

    #[tokio::test]
    async fn test_copy_reports_success_through_event_loop() {
        let mut h = harness(2, false);
        h.coordinator.handle_event(show(1));
        let index = h.coordinator.state().current.unwrap();

        h.coordinator.handle_event(UserAction::Copy.into());
        let result = h.events.recv().await.unwrap();
        assert_eq!(result, OverlayEvent::CopyFinished { ok: true });
        h.coordinator.handle_event(result);

        assert_eq!(
            h.clipboard.copied.lock().clone(),
            vec![format!("\"Quote {}\"\n\n— Author {}", index, index)]
        );
        assert_eq!(h.surface.frames().last(), Some(&Frame::CopyFlash(true)));
    }

    #[tokio::test]
    async fn test_copy_failure_changes_nothing_else() {
        let mut h = harness(2, true);
        h.coordinator.handle_event(show(1));
        let before = h.coordinator.state();

        h.coordinator.handle_event(UserAction::Copy.into());
        let result = h.events.recv().await.unwrap();
        h.coordinator.handle_event(result);

        assert_eq!(h.coordinator.state(), before);
        assert!(h.coordinator.timer().is_running());
        assert_eq!(h.surface.frames().last(), Some(&Frame::CopyFlash(false)));
    }

    #[tokio::test]
    async fn test_copy_while_hidden_is_noop() {
        let mut h = harness(2, false);
        h.coordinator.handle_event(UserAction::Copy.into());
        tokio::task::yield_now().await;
        assert!(h.clipboard.copied.lock().is_empty());
        assert!(h.events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_loop_rotates_and_stops() {
        let h = harness(3, false);
        let surface = h.surface.clone();
        let tx = h.events_tx.clone();
        let handle = tokio::spawn(h.coordinator.run(h.events));

        tx.send(show(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let first = surface.last_shown().unwrap();

        tokio::time::sleep(Duration::from_secs(10)).await;
        let second = surface.last_shown().unwrap();
        assert_ne!(first.quote, second.quote);

        tx.send(UserAction::Quit.into()).await.unwrap();
        handle.await.unwrap().unwrap();
        assert_eq!(surface.frames().last(), Some(&Frame::Hidden));
    }
}
