use crate::config::Config;
use crate::error::{OverlayError, Result};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::info;

#[async_trait::async_trait]
pub trait Clipboard: Send + Sync {
    /// Положить текст в буфер обмена
    async fn copy(&self, text: &str) -> Result<()>;
}

/// Factory function to create an appropriate clipboard based on the dry_run flag
pub fn create_clipboard(config: &Config, dry_run: bool) -> Arc<dyn Clipboard> {
    if dry_run {
        Arc::new(DryRunClipboard)
    } else {
        Arc::new(CommandClipboard::new(
            config.clipboard.command.clone(),
            config.clipboard_timeout(),
        ))
    }
}

/// Внешняя утилита (по умолчанию `wl-copy`), читающая текст из stdin; код 0 означает успех
pub struct CommandClipboard {
    command: String,
    timeout: Duration,
}

impl CommandClipboard {
    pub fn new(command: String, timeout: Duration) -> Self {
        Self { command, timeout }
    }

    async fn run(&self, text: &str) -> Result<()> {
        let mut child = Command::new(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        if let Some(mut stdin) = child.stdin.take() {
            // Утилита могла уже завершиться: о результате скажет код возврата
            if let Err(e) = stdin.write_all(text.as_bytes()).await {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
            // stdin закрывается при drop, иначе утилита ждёт EOF
        }

        // wl-copy оставляет фоновый процесс, который держит унаследованные дескрипторы:
        // ждём только выхода самой утилиты
        let status = child.wait().await?;
        if !status.success() {
            return Err(OverlayError::command_failed(&self.command, status, b""));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Clipboard for CommandClipboard {
    async fn copy(&self, text: &str) -> Result<()> {
        timeout(self.timeout, self.run(text))
            .await
            .map_err(|_| OverlayError::Timeout(format!("{} дольше {:?}", self.command, self.timeout)))?
    }
}

pub struct DryRunClipboard;

#[async_trait::async_trait]
impl Clipboard for DryRunClipboard {
    async fn copy(&self, text: &str) -> Result<()> {
        info!("[DRY RUN] В буфер обмена: {:?}", text);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_successful_command() {
        let clipboard = CommandClipboard::new("cat".to_string(), Duration::from_secs(2));
        assert!(clipboard.copy("\"Q\"\n\n— A").await.is_ok());
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_reported() {
        let clipboard = CommandClipboard::new("false".to_string(), Duration::from_secs(2));
        assert!(matches!(
            clipboard.copy("text").await,
            Err(OverlayError::CommandFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_missing_tool_is_reported() {
        let clipboard =
            CommandClipboard::new("wl-copy-not-installed".to_string(), Duration::from_secs(2));
        assert!(matches!(clipboard.copy("text").await, Err(OverlayError::Io(_))));
    }

    #[tokio::test]
    async fn test_tool_leaving_background_process_succeeds() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("fake-wl-copy");
        std::fs::write(&tool, "#!/bin/sh\ncat >/dev/null\n(sleep 5) &\nexit 0\n").unwrap();
        std::fs::set_permissions(&tool, std::fs::Permissions::from_mode(0o755)).unwrap();

        let clipboard = CommandClipboard::new(
            tool.to_string_lossy().into_owned(),
            Duration::from_secs(2),
        );
        let started = std::time::Instant::now();
        let result = clipboard.copy("text").await;

        assert!(result.is_ok(), "copy failed: {:?}", result);
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_dry_run_always_succeeds() {
        assert!(DryRunClipboard.copy("text").await.is_ok());
    }
}
