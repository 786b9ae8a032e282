//! Ошибки внешнего контура: конфигурация, файлы трассировки, канал движка.
//!
//! Ядро (нормализация ввода, трансформация, трекинг, валидация) ошибок не
//! возвращает: отклонённый ввод молча игнорируется.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum TrainerError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize {what}: {source}")]
    Serialize {
        what: String,
        source: serde_json::Error,
    },

    #[error("Unsupported {kind} schemaVersion: expected {expected}, got {found}")]
    UnsupportedSchema {
        kind: &'static str,
        expected: u32,
        found: u32,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to resolve local data directory")]
    NoDataDir,

    #[error("Engine task is no longer running")]
    EngineClosed,
}

pub type Result<T> = std::result::Result<T, TrainerError>;
