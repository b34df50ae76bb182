use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::{TextRecognitionMode, VisualFeature};
use crate::global_constants;

/// Settings read at startup. Missing fields fall back to defaults so a
/// partial file is still usable. The file is never written by the app.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub endpoint: Option<String>,
    pub analyze_path: String,
    pub recognize_text_path: String,
    pub operation_status_path: String,
    pub api_key_header: String,
    pub operation_location_header: String,
    pub visual_features: Vec<VisualFeature>,
    pub text_recognition_mode: TextRecognitionMode,
    pub max_poll_attempts: u32,
    pub poll_interval_ms: u64,
    pub operation_id_length: usize,
    pub target_dpi: f64,
    pub overlay_color: [u8; 4],
    pub overlay_stroke_width: u32,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            analyze_path: global_constants::DEFAULT_ANALYZE_PATH.to_string(),
            recognize_text_path: global_constants::DEFAULT_RECOGNIZE_TEXT_PATH.to_string(),
            operation_status_path: global_constants::DEFAULT_OPERATION_STATUS_PATH.to_string(),
            api_key_header: global_constants::DEFAULT_API_KEY_HEADER.to_string(),
            operation_location_header: global_constants::DEFAULT_OPERATION_LOCATION_HEADER
                .to_string(),
            visual_features: VisualFeature::default_set(),
            text_recognition_mode: TextRecognitionMode::default(),
            max_poll_attempts: global_constants::DEFAULT_MAX_POLL_ATTEMPTS,
            poll_interval_ms: global_constants::DEFAULT_POLL_INTERVAL_MS,
            operation_id_length: global_constants::OPERATION_ID_LENGTH,
            target_dpi: global_constants::DEFAULT_TARGET_DPI,
            overlay_color: global_constants::DEFAULT_OVERLAY_COLOR,
            overlay_stroke_width: global_constants::DEFAULT_OVERLAY_STROKE_WIDTH,
        }
    }
}

impl UserSettings {
    /// Loads settings from `explicit_path`, or from the per-user config
    /// directory when none is given.
    pub fn load(explicit_path: Option<&Path>) -> anyhow::Result<Self> {
        let settings_path = match explicit_path {
            Some(path) => path.to_path_buf(),
            None => Self::get_settings_file_path()?,
        };

        if !settings_path.exists() {
            if explicit_path.is_some() {
                anyhow::bail!("Settings file {:?} does not exist", settings_path);
            }
            log::info!("[SETTINGS] No settings file found, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&settings_path)
            .with_context(|| format!("Failed to read settings file {:?}", settings_path))?;
        let settings: UserSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings file {:?}", settings_path))?;

        log::info!("[SETTINGS] Loaded settings from {:?}", settings_path);
        log::debug!("[SETTINGS] Endpoint: {:?}", settings.endpoint);
        log::debug!(
            "[SETTINGS] Poll budget: {} attempts every {}ms",
            settings.max_poll_attempts,
            settings.poll_interval_ms
        );

        Ok(settings)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    fn get_settings_file_path() -> anyhow::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join(global_constants::CONFIG_DIR_NAME);

        Ok(config_dir.join(global_constants::SETTINGS_FILE_NAME))
    }
}
