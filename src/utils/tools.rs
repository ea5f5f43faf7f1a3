use crate::config::Config;
use crate::error::{OverlayError, Result};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Проверить наличие внешних утилит. Ничего не прерывает, только предупреждает.
pub fn check_tools(config: &Config, dry_run: bool) {
    info!("Проверка внешних утилит...");

    if dry_run {
        info!("Dry-run режим - внешние утилиты не требуются");
        return;
    }

    match find_tool(&config.clipboard.command) {
        Ok(path) => info!("Буфер обмена: {:?}", path),
        Err(e) => {
            warn!("{}. Копирование цитат работать не будет", e);
            warn!("   Установка: sudo pacman -S wl-clipboard");
        }
    }

    match find_tool(&config.window_manager.command) {
        Ok(path) => info!("Оконный менеджер: {:?}", path),
        Err(e) => warn!("{}. Оверлей будет считать рабочий стол занятым", e),
    }
}

/// Ищет исполняемый файл в PATH (или проверяет путь, если он указан явно)
pub fn find_tool(name: &str) -> Result<PathBuf> {
    if name.contains('/') {
        let path = PathBuf::from(name);
        return if is_executable(&path) {
            Ok(path)
        } else {
            Err(OverlayError::ToolMissing(name.to_string()))
        };
    }

    env::var_os("PATH")
        .iter()
        .flat_map(env::split_paths)
        .map(|dir| dir.join(name))
        .find(|candidate| is_executable(candidate))
        .ok_or_else(|| OverlayError::ToolMissing(name.to_string()))
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}
