pub mod marker;
pub mod tools;

pub use marker::MarkerFile;

// Условное логирование: аргументы не вычисляются, если DEBUG выключен
#[macro_export]
macro_rules! debug_if_enabled {
    ($($arg:tt)*) => {
        if tracing::enabled!(tracing::Level::DEBUG) {
            tracing::debug!($($arg)*);
        }
    };
}
