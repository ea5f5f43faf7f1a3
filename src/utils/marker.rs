use crate::error::Result;
use crate::events::WindowHandle;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Файл-метка с адресом окна оверлея; существует, пока жив процесс
#[derive(Debug, Clone)]
pub struct MarkerFile {
    path: PathBuf,
}

impl MarkerFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Создаёт или перезаписывает метку
    pub fn write(&self, handle: &WindowHandle) -> Result<()> {
        fs::write(&self.path, handle.0.as_str())?;
        info!("Адрес окна {} записан в {:?}", handle, self.path);
        Ok(())
    }

    /// Удаление идемпотентно: отсутствие файла не ошибка
    pub fn remove(&self) {
        match fs::remove_file(&self.path) {
            Ok(()) => info!("Файл-метка {:?} удалён", self.path),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!("Не удалось удалить {:?}: {}", self.path, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_overwrite_and_remove() {
        let dir = tempfile::tempdir().unwrap();
        let marker = MarkerFile::new(dir.path().join("quote_window_addr"));

        marker.write(&WindowHandle::new("0xabc")).unwrap();
        marker.write(&WindowHandle::new("0xdef")).unwrap();
        assert_eq!(fs::read_to_string(marker.path()).unwrap(), "0xdef");

        marker.remove();
        assert!(!marker.path().exists());
        marker.remove();
    }
}
