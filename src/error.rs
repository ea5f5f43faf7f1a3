use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка разбора JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Команда `{program}` завершилась с ошибкой ({status}): {stderr}")]
    CommandFailed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("Таймаут: {0}")]
    Timeout(String),

    #[error("Утилита не найдена: {0}")]
    ToolMissing(String),

}

impl OverlayError {
    pub fn command_failed(
        program: impl Into<String>,
        status: impl ToString,
        stderr: &[u8],
    ) -> Self {
        OverlayError::CommandFailed {
            program: program.into(),
            status: status.to_string(),
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OverlayError>;
