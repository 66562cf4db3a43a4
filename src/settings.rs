use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Shortest allowed data refresh interval.
pub const MIN_REFRESH_SECS: u64 = 5;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Root of the CRM record API. A trailing slash is added when missing.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Timeout applied to every API request, in seconds.
    #[serde(default = "default_api_timeout")]
    pub api_timeout_secs: u64,
    /// File backing the dashboard layout. Defaults to the user data directory.
    #[serde(default)]
    pub layout_path: Option<String>,
    /// How often dashboard data is fetched again, in seconds.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    /// When enabled the application initialises the logger at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Optional file receiving log output.
    #[serde(default)]
    pub log_file: Option<String>,
    /// Enable toast notifications in the UI.
    #[serde(default = "default_toasts")]
    pub enable_toasts: bool,
    /// Duration of toast notifications in seconds.
    #[serde(default = "default_toast_duration")]
    pub toast_duration: f32,
}

fn default_api_base_url() -> String {
    "http://localhost:8000/api/crm/".into()
}

fn default_api_timeout() -> u64 {
    30
}

fn default_refresh_interval() -> u64 {
    60
}

fn default_toasts() -> bool {
    true
}

fn default_toast_duration() -> f32 {
    3.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_timeout_secs: default_api_timeout(),
            layout_path: None,
            refresh_interval_secs: default_refresh_interval(),
            debug_logging: false,
            log_file: None,
            enable_toasts: true,
            toast_duration: default_toast_duration(),
        }
    }
}

impl Settings {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).unwrap_or_default();
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs.max(1))
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(MIN_REFRESH_SECS))
    }

    /// Resolved layout file. Falls back to `crm_dashboard/layout.json` under
    /// the platform data directory, or the working directory when unknown.
    pub fn layout_path(&self) -> PathBuf {
        if let Some(path) = self.layout_path.as_deref().filter(|p| !p.trim().is_empty()) {
            return PathBuf::from(path);
        }
        dirs_next::data_dir()
            .map(|dir| dir.join("crm_dashboard"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("layout.json")
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.log_file
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let s: Settings = serde_json::from_str(r#"{"debug_logging":true}"#).unwrap();
        assert!(s.debug_logging);
        assert_eq!(s.api_base_url, "http://localhost:8000/api/crm/");
        assert_eq!(s.refresh_interval_secs, 60);
        assert!(s.enable_toasts);
    }

    #[test]
    fn refresh_interval_has_a_floor() {
        let s = Settings {
            refresh_interval_secs: 1,
            ..Settings::default()
        };
        assert_eq!(s.refresh_interval(), Duration::from_secs(MIN_REFRESH_SECS));
    }

    #[test]
    fn explicit_layout_path_wins() {
        let s = Settings {
            layout_path: Some("/tmp/layout.json".into()),
            ..Settings::default()
        };
        assert_eq!(s.layout_path(), PathBuf::from("/tmp/layout.json"));
        assert!(Settings::default().layout_path().ends_with("crm_dashboard/layout.json"));
    }
}
