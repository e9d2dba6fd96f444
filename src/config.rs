// src/config.rs
use std::path::Path;
use std::time::Duration;
use anyhow::{ensure, Context, Result};
use serde::Deserialize;

/// Viewer tunables. Every field has a default; a JSON file only needs the
/// keys it wants to change.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Control API root, e.g. `http://127.0.0.1:8000/api`.
    pub api_base: String,
    /// Push channel URL.
    pub stream_url: String,
    pub window_seconds: f64,
    pub plot_refresh_ms: u64,
    pub max_plot_points: usize,
    pub status_poll_ms: u64,
    pub stale_threshold_ms: u64,
    /// Rate assumed until the stream or a connect says otherwise.
    pub default_sample_rate_hz: u32,
    pub default_baud: u32,
    /// Lines kept in the GUI log list.
    pub log_capacity: usize,
    pub request_timeout_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:8000/api".to_owned(),
            stream_url: "ws://127.0.0.1:8000/ws".to_owned(),
            window_seconds: 10.0,
            plot_refresh_ms: 1000,
            max_plot_points: 5000,
            status_poll_ms: 800,
            stale_threshold_ms: 1500,
            default_sample_rate_hz: 16_000,
            default_baud: 921_600,
            log_capacity: 300,
            request_timeout_ms: 3000,
        }
    }
}

impl ViewerConfig {
    /// Defaults, overlaid with the JSON file at `path` when one is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.window_seconds.is_finite() && self.window_seconds > 0.0,
            "window_seconds must be positive"
        );
        ensure!(self.plot_refresh_ms > 0, "plot_refresh_ms must be positive");
        ensure!(self.status_poll_ms > 0, "status_poll_ms must be positive");
        ensure!(self.max_plot_points > 0, "max_plot_points must be positive");
        ensure!(self.default_sample_rate_hz > 0, "default_sample_rate_hz must be positive");
        ensure!(!self.api_base.is_empty(), "api_base must not be empty");
        ensure!(!self.stream_url.is_empty(), "stream_url must not be empty");
        Ok(())
    }

    pub fn plot_refresh(&self) -> Duration {
        Duration::from_millis(self.plot_refresh_ms)
    }

    pub fn status_poll(&self) -> Duration {
        Duration::from_millis(self.status_poll_ms)
    }

    pub fn stale_threshold(&self) -> Duration {
        Duration::from_millis(self.stale_threshold_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_viewer_constants() {
        let config = ViewerConfig::default();
        assert_eq!(config.window_seconds, 10.0);
        assert_eq!(config.plot_refresh(), Duration::from_millis(1000));
        assert_eq!(config.max_plot_points, 5000);
        assert_eq!(config.status_poll(), Duration::from_millis(800));
        assert_eq!(config.stale_threshold(), Duration::from_millis(1500));
        assert_eq!(config.default_sample_rate_hz, 16_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let config = ViewerConfig::from_json(r#"{"window_seconds": 5, "api_base": "http://scope:9000/api"}"#)
            .unwrap();
        assert_eq!(config.window_seconds, 5.0);
        assert_eq!(config.api_base, "http://scope:9000/api");
        assert_eq!(config.max_plot_points, 5000);
    }

    #[test]
    fn rejects_nonsense() {
        let zero_window = ViewerConfig {
            window_seconds: 0.0,
            ..ViewerConfig::default()
        };
        assert!(zero_window.validate().is_err());
        let zero_cap = ViewerConfig {
            max_plot_points: 0,
            ..ViewerConfig::default()
        };
        assert!(zero_cap.validate().is_err());
        assert!(ViewerConfig::from_json(r#"{"window_seconds": "ten"}"#).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = ViewerConfig::load(Some(Path::new("/definitely/not/here.json"))).unwrap_err();
        assert!(err.to_string().contains("reading config"));
        assert_eq!(ViewerConfig::load(None).unwrap(), ViewerConfig::default());
    }
}
