use crate::error::Result;
use crate::services::quote_store::{NavState, Quote};
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    queue,
    style::{Print, Stylize},
    terminal::{Clear, ClearType, SetTitle},
};
use std::io::Write;

/// Максимальная ширина строки цитаты
pub const WRAP_WIDTH: usize = 70;

/// Всё, что нужно поверхности для отрисовки одной цитаты
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayView {
    pub quote: Quote,
    pub nav: NavState,
    pub paused: bool,
}

/// Поверхность оверлея. Живёт в задаче координатора, вызывается только оттуда.
pub trait OverlaySurface: Send {
    fn show(&mut self, view: &OverlayView) -> Result<()>;
    fn hide(&mut self) -> Result<()>;
    /// Кратковременный признак результата копирования, держится до следующей отрисовки
    fn flash_copy(&mut self, ok: bool) -> Result<()>;
}

/// Рисует оверлей в терминале, в котором запущен процесс. Окно терминала и есть окно
/// оверлея: заголовок выставляется в идентификатор, по которому его находит опрос.
pub struct TerminalSurface<W: Write + Send> {
    out: W,
    last_view: Option<OverlayView>,
}

impl TerminalSurface<std::io::Stdout> {
    pub fn stdout(title: &str) -> Result<Self> {
        Self::new(std::io::stdout(), title)
    }
}

impl<W: Write + Send> TerminalSurface<W> {
    pub fn new(mut out: W, title: &str) -> Result<Self> {
        queue!(out, SetTitle(title), Hide, Clear(ClearType::All))?;
        out.flush()?;
        Ok(Self {
            out,
            last_view: None,
        })
    }

    fn render(&mut self, view: &OverlayView, copy_marker: Option<bool>) -> Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;

        let copy_label = match copy_marker {
            Some(true) => "✓",
            Some(false) => "✗",
            None => "📋",
        };
        let pause_label = if view.paused { "▶ play" } else { "⏸ pause" };
        let buttons = [
            ("◀ prev", view.nav.prev_enabled),
            (pause_label, true),
            ("next ▶", view.nav.next_enabled),
            (copy_label, view.nav.copy_enabled),
        ];

        for (label, enabled) in buttons {
            let button = format!("[{}] ", label);
            if enabled {
                queue!(self.out, Print(button.bold()))?;
            } else {
                queue!(self.out, Print(button.dim()))?;
            }
        }
        queue!(self.out, Print("\r\n\r\n"))?;

        for line in wrap_text(&view.quote.quote, WRAP_WIDTH) {
            queue!(self.out, Print(line.italic()), Print("\r\n"))?;
        }
        queue!(
            self.out,
            Print("\r\n"),
            Print(format!("— {}", view.quote.author).bold()),
            Print("\r\n")
        )?;

        self.out.flush()?;
        Ok(())
    }
}

impl<W: Write + Send> OverlaySurface for TerminalSurface<W> {
    fn show(&mut self, view: &OverlayView) -> Result<()> {
        self.render(view, None)?;
        self.last_view = Some(view.clone());
        Ok(())
    }

    fn hide(&mut self) -> Result<()> {
        self.last_view = None;
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        self.out.flush()?;
        Ok(())
    }

    fn flash_copy(&mut self, ok: bool) -> Result<()> {
        if let Some(view) = self.last_view.clone() {
            self.render(&view, Some(ok))?;
        }
        Ok(())
    }
}

impl<W: Write + Send> Drop for TerminalSurface<W> {
    fn drop(&mut self) {
        let _ = queue!(self.out, Clear(ClearType::All), MoveTo(0, 0), Show);
        let _ = self.out.flush();
    }
}

/// Перенос по словам: строка не длиннее `width`, если слово само не длиннее
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
pub mod recording {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Frame {
        Shown(OverlayView),
        Hidden,
        CopyFlash(bool),
    }

    /// Запоминает все вызовы поверхности; кадры доступны тесту через общий буфер
    #[derive(Clone, Default)]
    pub struct RecordingSurface {
        frames: Arc<Mutex<Vec<Frame>>>,
    }

    impl RecordingSurface {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn frames(&self) -> Vec<Frame> {
            self.frames.lock().clone()
        }

        pub fn last_shown(&self) -> Option<OverlayView> {
            self.frames.lock().iter().rev().find_map(|frame| match frame {
                Frame::Shown(view) => Some(view.clone()),
                _ => None,
            })
        }
    }

    impl OverlaySurface for RecordingSurface {
        fn show(&mut self, view: &OverlayView) -> Result<()> {
            self.frames.lock().push(Frame::Shown(view.clone()));
            Ok(())
        }

        fn hide(&mut self) -> Result<()> {
            self.frames.lock().push(Frame::Hidden);
            Ok(())
        }

        fn flash_copy(&mut self, ok: bool) -> Result<()> {
            self.frames.lock().push(Frame::CopyFlash(ok));
            Ok(())
        }
    }
}
