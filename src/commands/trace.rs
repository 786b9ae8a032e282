//! trace_io — сохранение и чтение трассировок сессий.

use std::path::{Path, PathBuf};

use crate::error::{Result, TrainerError};
use crate::models::trace::{SessionTrace, SCHEMA_VERSION};

/// Сохраняет трассировку в `{dir}/{session_id}.json`.
///
/// Если `dir` не передан — используется `{LocalData}/IncisionTrainer/traces`.
pub fn save_trace(trace: &SessionTrace, dir: Option<&Path>) -> Result<PathBuf> {
    if trace.schema_version != SCHEMA_VERSION {
        return Err(TrainerError::UnsupportedSchema {
            kind: "trace",
            expected: SCHEMA_VERSION,
            found: trace.schema_version,
        });
    }

    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => traces_root()?,
    };
    std::fs::create_dir_all(&dir).map_err(|source| TrainerError::Write {
        path: dir.clone(),
        source,
    })?;

    let path = dir.join(format!("{}.json", trace.session_id));
    let json = serde_json::to_string_pretty(trace).map_err(|source| TrainerError::Serialize {
        what: format!("trace {}", trace.session_id),
        source,
    })?;
    std::fs::write(&path, json).map_err(|source| TrainerError::Write {
        path: path.clone(),
        source,
    })?;

    log::info!(
        "save_trace: id={} samples={} path={}",
        trace.session_id,
        trace.samples.len(),
        path.display()
    );
    Ok(path)
}

pub fn load_trace(path: impl AsRef<Path>) -> Result<SessionTrace> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| TrainerError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let trace: SessionTrace = serde_json::from_str(&raw).map_err(|source| TrainerError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if trace.schema_version != SCHEMA_VERSION {
        return Err(TrainerError::UnsupportedSchema {
            kind: "trace",
            expected: SCHEMA_VERSION,
            found: trace.schema_version,
        });
    }
    Ok(trace)
}

/// Возвращает трассировки из папки, от новых к старым. Битые файлы пропускаются.
pub fn list_traces(dir: impl AsRef<Path>) -> Result<Vec<SessionTrace>> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(dir).map_err(|source| TrainerError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut traces = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("list_traces: failed to read dir entry: {e}");
                continue;
            }
        };
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        match load_trace(&path) {
            Ok(trace) => traces.push(trace),
            Err(e) => log::warn!("list_traces: skipping {}: {e}", path.display()),
        }
    }

    traces.sort_by(|a, b| b.started_at_ms.cmp(&a.started_at_ms));
    Ok(traces)
}

pub fn traces_root() -> Result<PathBuf> {
    let base = dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .ok_or(TrainerError::NoDataDir)?;
    Ok(base.join("IncisionTrainer").join("traces"))
}
