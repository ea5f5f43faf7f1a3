//! Countdown for quote rotation.
//!
//! The controller is a plain state machine owned by the coordinator task: it never spawns
//! anything itself. The event loop asks for [`TimerController::deadline`], waits on it with
//! [`wait_for_deadline`], and calls [`TimerController::fire`] once it elapses. Every expiry is a
//! one-shot schedule; the coordinator re-arms with [`TimerController::start`] after advancing
//! the quote.

use crate::debug_if_enabled;
use std::time::Duration;
use tokio::time::Instant;

/// Минимальная задержка при возобновлении, чтобы не планировать нулевой/отрицательный таймаут
pub const RESUME_FLOOR: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running { started_at: Instant, deadline: Instant },
    Paused { started_at: Instant, paused_at: Instant },
}

#[derive(Debug)]
pub struct TimerController {
    duration: Duration,
    state: TimerState,
}

impl TimerController {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            state: TimerState::Idle,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> TimerState {
        self.state
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Running { .. })
    }

    #[cfg(test)]
    pub fn is_paused(&self) -> bool {
        matches!(self.state, TimerState::Paused { .. })
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            TimerState::Running { deadline, .. } => Some(deadline),
            _ => None,
        }
    }

    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    /// Отменяет текущее расписание и ставит новое на полный интервал
    pub fn start_at(&mut self, now: Instant) {
        self.state = TimerState::Running {
            started_at: now,
            deadline: now + self.duration,
        };
        debug_if_enabled!("Таймер запущен на {:?}", self.duration);
    }

    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    /// Полный интервал заново. На паузе таймер остаётся на паузе, но без накопленного времени.
    pub fn reset_at(&mut self, now: Instant) {
        match self.state {
            TimerState::Paused { .. } => {
                self.state = TimerState::Paused {
                    started_at: now,
                    paused_at: now,
                };
                debug_if_enabled!("Таймер на паузе сброшен на полный интервал");
            }
            TimerState::Idle | TimerState::Running { .. } => self.start_at(now),
        }
    }

    pub fn pause(&mut self) -> bool {
        self.pause_at(Instant::now())
    }

    /// Только из Running; иначе ничего не меняет и возвращает false
    pub fn pause_at(&mut self, now: Instant) -> bool {
        match self.state {
            TimerState::Running { started_at, .. } => {
                self.state = TimerState::Paused {
                    started_at,
                    paused_at: now,
                };
                debug_if_enabled!("Таймер на паузе, прошло {:?}", now.saturating_duration_since(started_at));
                true
            }
            _ => false,
        }
    }

    pub fn resume(&mut self) -> bool {
        self.resume_at(Instant::now())
    }

    /// Только из Paused. Остаток = max(RESUME_FLOOR, duration - (paused_at - started_at));
    /// время, проведённое на паузе, в прошедшее не засчитывается.
    pub fn resume_at(&mut self, now: Instant) -> bool {
        match self.state {
            TimerState::Paused {
                started_at,
                paused_at,
            } => {
                let elapsed = paused_at.saturating_duration_since(started_at);
                let remaining = self.remaining_after(elapsed);
                self.state = TimerState::Running {
                    started_at: now.checked_sub(elapsed).unwrap_or(now),
                    deadline: now + remaining,
                };
                debug_if_enabled!("Таймер возобновлён, осталось {:?}", remaining);
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        if self.state != TimerState::Idle {
            debug_if_enabled!("Таймер отменён");
        }
        self.state = TimerState::Idle;
    }

    pub fn fire(&mut self) -> bool {
        self.fire_at(Instant::now())
    }

    /// Срабатывает ровно один раз на одно расписание и переводит таймер в Idle
    pub fn fire_at(&mut self, now: Instant) -> bool {
        match self.state {
            TimerState::Running { deadline, .. } if now >= deadline => {
                self.state = TimerState::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn remaining_at(&self, now: Instant) -> Option<Duration> {
        match self.state {
            TimerState::Idle => None,
            TimerState::Running { deadline, .. } => Some(deadline.saturating_duration_since(now)),
            TimerState::Paused {
                started_at,
                paused_at,
            } => Some(self.remaining_after(paused_at.saturating_duration_since(started_at))),
        }
    }

    fn remaining_after(&self, elapsed: Duration) -> Duration {
        self.duration.saturating_sub(elapsed).max(RESUME_FLOOR)
    }
}

/// Ждёт дедлайн таймера; без дедлайна не завершается никогда
pub async fn wait_for_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
