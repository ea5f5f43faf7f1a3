use crate::error::Result;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Цитата в том виде, в каком она лежит в JSON-файле
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub author: String,
    pub quote: String,
}

impl Quote {
    pub fn new(author: &str, quote: &str) -> Self {
        Self {
            author: author.to_string(),
            quote: quote.to_string(),
        }
    }

    /// Текст для буфера обмена: `"<цитата>"`, пустая строка, `— <автор>`
    pub fn clipboard_text(&self) -> String {
        format!("\"{}\"\n\n— {}", self.quote, self.author)
    }
}

/// Доступность кнопок навигации для текущего индекса
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavState {
    pub prev_enabled: bool,
    pub next_enabled: bool,
    pub copy_enabled: bool,
}

/// Упорядоченный набор цитат, загружается один раз при старте
#[derive(Debug, Clone, Default)]
pub struct QuoteStore {
    quotes: Vec<Quote>,
}

impl QuoteStore {
    pub fn from_quotes(quotes: Vec<Quote>) -> Self {
        Self { quotes }
    }

    /// Загрузка никогда не падает: при любой проблеме с файлом подставляется встроенный список
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();

        match Self::read_file(path) {
            Ok(quotes) if !quotes.is_empty() => {
                info!("Загружено {} цитат из {:?}", quotes.len(), path);
                Self { quotes }
            }
            Ok(_) => {
                warn!("В файле {:?} нет цитат, используем встроенные", path);
                Self::from_quotes(empty_file_fallback())
            }
            Err(e) => {
                warn!("Ошибка загрузки цитат из {:?}: {}", path, e);
                Self::from_quotes(load_error_fallback())
            }
        }
    }

    fn read_file(path: &Path) -> Result<Vec<Quote>> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Создаёт файл с примерами, если его ещё нет. Ошибка только логируется.
    pub fn ensure_seed_file<P: AsRef<Path>>(path: P) {
        let path = path.as_ref();
        if path.exists() {
            return;
        }

        info!("Создаём файл с примерами цитат: {:?}", path);
        if let Err(e) = Self::write_seed_file(path) {
            warn!("Не удалось создать файл цитат {:?}: {}", path, e);
        }
    }

    fn write_seed_file(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&seed_quotes())?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn get(&self, index: usize) -> Option<&Quote> {
        self.quotes.get(index)
    }

    pub fn select_random(&self, exclude: Option<usize>) -> Option<usize> {
        self.select_random_with(exclude, &mut rand::thread_rng())
    }

    /// Равномерный выбор среди всех индексов, кроме `exclude` (если цитат больше одной)
    pub fn select_random_with<R: Rng + ?Sized>(
        &self,
        exclude: Option<usize>,
        rng: &mut R,
    ) -> Option<usize> {
        match self.quotes.len() {
            0 => None,
            1 => Some(0),
            len => match exclude.filter(|&e| e < len) {
                Some(excluded) => {
                    let pick = rng.gen_range(0..len - 1);
                    Some(if pick >= excluded { pick + 1 } else { pick })
                }
                None => Some(rng.gen_range(0..len)),
            },
        }
    }

    pub fn select_next(&self, current: Option<usize>) -> Option<usize> {
        let len = self.quotes.len();
        if len == 0 {
            return None;
        }
        Some(match current {
            Some(index) => (index + 1) % len,
            None => 0,
        })
    }

    pub fn select_prev(&self, current: Option<usize>) -> Option<usize> {
        let len = self.quotes.len();
        if len == 0 {
            return None;
        }
        Some(match current {
            Some(index) if index > 0 && index < len => index - 1,
            _ => len - 1,
        })
    }

    pub fn nav_state(&self, index: usize) -> NavState {
        if index >= self.quotes.len() {
            return NavState::default();
        }
        NavState {
            prev_enabled: index > 0,
            next_enabled: index + 1 < self.quotes.len(),
            copy_enabled: true,
        }
    }
}

fn seed_quotes() -> Vec<Quote> {
    vec![
        Quote::new(
            "Jason Gorman",
            "Refuctoring - the process of taking a well-designed piece of code and, through a series of small, reversible changes, making it completely unmaintainable by anyone except yourself.",
        ),
        Quote::new(
            "E. W. Dijkstra",
            "If debugging is the process of removing software bugs, then programming must be the process of putting them in.",
        ),
        Quote::new("Alan Kay", "The best way to predict the future is to invent it."),
        Quote::new("Linus Torvalds", "Talk is cheap. Show me the code."),
    ]
}

const LEARN_BY_WRITING: &str =
    "The only way to learn a new programming language is by writing programs in it.";

fn empty_file_fallback() -> Vec<Quote> {
    vec![
        Quote::new("System", "Add quotes to your JSON file"),
        Quote::new("Unknown", LEARN_BY_WRITING),
    ]
}

fn load_error_fallback() -> Vec<Quote> {
    vec![
        Quote::new("System", "Error loading quotes file"),
        Quote::new("Unknown", LEARN_BY_WRITING),
    ]
}
