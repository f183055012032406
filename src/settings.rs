//! User settings stored as settings.json in the app data directory

use crate::constants::DEFAULT_SERVER_URL;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Window geometry
    pub window_x: Option<f32>,
    pub window_y: Option<f32>,
    pub window_w: Option<f32>,
    pub window_h: Option<f32>,

    // Analysis service
    pub server_url: Option<String>,

    // Paths
    pub download_path: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_x: None,
            window_y: None,
            window_w: None,
            window_h: None,
            server_url: None,
            download_path: None,
        }
    }
}

impl Settings {
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join("settings.json");
        match std::fs::read_to_string(&path) {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(settings) => {
                    debug!(path = %path.display(), "Settings loaded");
                    settings
                }
                Err(e) => {
                    warn!(error = %e, "Failed to parse settings, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                debug!("No settings file found, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, data_dir: &Path) {
        let path = data_dir.join("settings.json");
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    warn!(error = %e, "Failed to save settings");
                }
            }
            Err(e) => warn!(error = %e, "Failed to serialize settings"),
        }
    }

    pub fn server_url_or_default(&self) -> String {
        self.server_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SERVER_URL)
            .trim_end_matches('/')
            .to_string()
    }

    pub fn download_path_or_default(&self) -> PathBuf {
        self.download_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::download_dir().unwrap_or_else(|| PathBuf::from("."))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_server_url_used_for_empty_override() {
        let mut settings = Settings::default();
        assert_eq!(settings.server_url_or_default(), DEFAULT_SERVER_URL);

        settings.server_url = Some("   ".to_string());
        assert_eq!(settings.server_url_or_default(), DEFAULT_SERVER_URL);
    }

    #[test]
    fn trailing_slash_is_stripped_from_server_url() {
        let settings = Settings {
            server_url: Some("http://analysis.internal:5000/".to_string()),
            ..Settings::default()
        };
        assert_eq!(
            settings.server_url_or_default(),
            "http://analysis.internal:5000"
        );
    }
}
