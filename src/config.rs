use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub quotes: QuotesConfig,
    pub poller: PollerConfig,
    pub window_manager: WindowManagerConfig,
    pub clipboard: ClipboardConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuotesConfig {
    pub file: PathBuf,
    pub display_duration_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollerConfig {
    pub interval_ms: u64,
    /// Строка, по которой оверлей узнаёт своё окно (class или часть title)
    pub overlay_identifier: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WindowManagerConfig {
    pub command: String,
    pub command_timeout_ms: u64,
    pub scratch_workspace: String,
    pub marker_file: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClipboardConfig {
    pub command: String,
    pub timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "compact".to_string(),
            },
            quotes: QuotesConfig {
                file: PathBuf::from("assets/programming-quotes.json"),
                display_duration_secs: 10,
            },
            poller: PollerConfig {
                interval_ms: 500,
                overlay_identifier: "Quote Display".to_string(),
            },
            window_manager: WindowManagerConfig {
                command: "hyprctl".to_string(),
                command_timeout_ms: 1000,
                scratch_workspace: "special:scratchpad".to_string(),
                marker_file: PathBuf::from("/tmp/quote_window_addr"),
            },
            clipboard: ClipboardConfig {
                command: "wl-copy".to_string(),
                timeout_ms: 2000,
            },
        }
    }
}

impl Config {
    /// Загружает конфигурацию: значения по умолчанию, затем TOML-файл (если есть), затем переменные `HYPRQUOTES_*`
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("HYPRQUOTES_").split("__"));

        let config: Config = figment
            .extract()
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))?;

        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "compact" | "full" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        if self.quotes.display_duration_secs == 0 {
            anyhow::bail!("display_duration_secs должно быть больше 0");
        }

        if self.poller.interval_ms < 100 {
            anyhow::bail!("interval_ms должно быть минимум 100");
        }

        if self.poller.overlay_identifier.trim().is_empty() {
            anyhow::bail!("overlay_identifier не может быть пустым");
        }

        if self.window_manager.command_timeout_ms == 0 || self.clipboard.timeout_ms == 0 {
            anyhow::bail!("Таймауты внешних команд должны быть больше 0");
        }

        if self.window_manager.scratch_workspace.is_empty() {
            anyhow::bail!("scratch_workspace не может быть пустым");
        }

        Ok(())
    }

    pub fn display_duration(&self) -> Duration {
        Duration::from_secs(self.quotes.display_duration_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poller.interval_ms)
    }

    pub fn wm_timeout(&self) -> Duration {
        Duration::from_millis(self.window_manager.command_timeout_ms)
    }

    pub fn clipboard_timeout(&self) -> Duration {
        Duration::from_millis(self.clipboard.timeout_ms)
    }
}
