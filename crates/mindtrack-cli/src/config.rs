use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use mindtrack_model::backend::{DEFAULT_MODEL_PATH, MODEL_PATH_ENV};
use mindtrack_model::category::Thresholds;

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindtrackConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    #[serde(default)]
    pub config_version: u32,
    /// Classifier artifact. Overridden by `MINDTRACK_MODEL_PATH`.
    pub model_path: PathBuf,
    /// Root for the autosave cache and the local submission store.
    pub data_dir: PathBuf,
    /// Risk band cut points. Added in v1.
    pub thresholds: Thresholds,
    /// Default user for `run` and `history`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_id: Option<String>,
}

impl Default for MindtrackConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            data_dir: default_data_dir(),
            thresholds: Thresholds::default(),
            user_id: None,
        }
    }
}

impl MindtrackConfig {
    /// Model path after applying the environment override.
    pub fn effective_model_path(&self) -> PathBuf {
        std::env::var_os(MODEL_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| self.model_path.clone())
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.data_dir.join("autosave")
    }

    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("mindtrack"))
        .unwrap_or_else(|| PathBuf::from("mindtrack-data"))
}

fn config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("mindtrack"))
}

pub fn config_path() -> eyre::Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

/// Load from the default location; a missing file yields defaults.
pub fn load_config() -> eyre::Result<MindtrackConfig> {
    load_config_from(&config_path()?)
}

pub fn load_config_from(path: &Path) -> eyre::Result<MindtrackConfig> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(MindtrackConfig::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .unwrap_or(0) as u32;

    let migrated = migrate(json, on_disk_version)?;
    let config: MindtrackConfig = serde_json::from_value(migrated)?;
    Thresholds::new(config.thresholds.low, config.thresholds.high)?;
    Ok(config)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
///
/// Each migration is a pure transform on the raw JSON value.
pub fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update mindtrack."
        ));
    }

    // v0 → v1: add thresholds (the historical fixed bands)
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
        obj.entry("thresholds")
            .or_insert(serde_json::to_value(Thresholds::default())?);
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("migrated config v0 → v1 (added thresholds)");
    }

    Ok(json)
}

pub fn save_config(config: &MindtrackConfig) -> eyre::Result<PathBuf> {
    let path = config_path()?;
    save_config_to(&path, config)?;
    Ok(path)
}

pub fn save_config_to(path: &Path, config: &MindtrackConfig) -> eyre::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| eyre::eyre!("config path has no parent: {}", path.display()))?;
    std::fs::create_dir_all(dir)?;

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;

    let json = serde_json::to_string_pretty(&stamped)?;

    // Write to a temp file then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}
