//! config_io — загрузка/сохранение trainer.json.

use std::path::{Path, PathBuf};

use crate::error::{Result, TrainerError};
use crate::models::config::{ConfigProfile, EngineConfig};

pub const CONFIG_FILE_NAME: &str = "trainer.json";

/// Загружает и проверяет конфигурацию.
///
/// Поддерживает как путь к файлу, так и путь к директории упражнения.
pub fn load_config(path: impl AsRef<Path>) -> Result<EngineConfig> {
    let path = resolve_config_file(path.as_ref());
    log::info!("load_config: path={}", path.display());

    let raw = std::fs::read_to_string(&path).map_err(|source| TrainerError::Read {
        path: path.clone(),
        source,
    })?;
    let config = EngineConfig::from_json_str(&raw).map_err(|source| TrainerError::Parse {
        path: path.clone(),
        source,
    })?;

    config.validate()?;
    Ok(config)
}

/// Загружает конфигурацию, если файл существует, иначе возвращает профиль.
pub fn load_config_or_profile(
    path: impl AsRef<Path>,
    fallback: ConfigProfile,
) -> Result<EngineConfig> {
    let path = resolve_config_file(path.as_ref());
    if path.exists() {
        return load_config(&path);
    }
    log::warn!(
        "load_config_or_profile: {} not found, using profile {fallback:?}",
        path.display()
    );
    Ok(EngineConfig::profile(fallback))
}

/// Сохраняет конфигурацию. Некорректная конфигурация не записывается.
pub fn save_config(config: &EngineConfig, path: impl AsRef<Path>) -> Result<PathBuf> {
    config.validate()?;
    let path = resolve_config_file(path.as_ref());

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| TrainerError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let json = serde_json::to_string_pretty(config).map_err(|source| TrainerError::Serialize {
        what: "config".to_string(),
        source,
    })?;
    std::fs::write(&path, json).map_err(|source| TrainerError::Write {
        path: path.clone(),
        source,
    })?;

    log::info!("save_config: path={}", path.display());
    Ok(path)
}

fn resolve_config_file(path: &Path) -> PathBuf {
    if path.is_dir() {
        path.join(CONFIG_FILE_NAME)
    } else {
        path.to_path_buf()
    }
}
