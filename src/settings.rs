use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    ACCESS_TOKEN_ENV, DEFAULT_BOUNDARY_FEED_URL, DEFAULT_EVENT_FEED_URL, DEFAULT_FETCH_TIMEOUT_SECS,
    DEFAULT_PORT,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub port: u16,
    pub event_feed_url: String,
    pub boundary_feed_url: String,
    /// Tile provider credential. Never serialized back to clients.
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    pub fetch_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            event_feed_url: DEFAULT_EVENT_FEED_URL.to_string(),
            boundary_feed_url: DEFAULT_BOUNDARY_FEED_URL.to_string(),
            access_token: None,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Loads `quakemap.ini` next to the executable, then applies the
    /// `MAPBOX_ACCESS_TOKEN` environment override.
    pub fn load() -> Result<Self> {
        let mut settings = Self::load_from(&Self::config_path())?;
        if let Ok(token) = std::env::var(ACCESS_TOKEN_ENV) {
            settings.apply_access_token(&token);
        }
        Ok(settings)
    }

    /// Reads `key = value` lines. A missing file yields the defaults; values
    /// that fail to parse leave the default in place.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        let mut settings = Settings::default();
        if !config_path.exists() {
            return Ok(settings);
        }

        let file = File::open(config_path).context("Failed to open config file")?;
        let reader = BufReader::new(file);
        let mut config_map = HashMap::new();

        for line in reader.lines() {
            let line = line.context("Failed to read line from config")?;
            let line = line.trim();
            if line.starts_with('#') || line.is_empty() {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                config_map.insert(key.trim().to_string(), value.trim().trim_matches('"').to_string());
            }
        }

        if let Some(port_str) = config_map.get("port") {
            if let Ok(port) = port_str.parse::<u16>() {
                settings.port = port;
            }
        }
        if let Some(url) = config_map.get("event_feed_url").filter(|u| !u.is_empty()) {
            settings.event_feed_url = url.clone();
        }
        if let Some(url) = config_map.get("boundary_feed_url").filter(|u| !u.is_empty()) {
            settings.boundary_feed_url = url.clone();
        }
        if let Some(token) = config_map.get("access_token") {
            settings.apply_access_token(token);
        }
        if let Some(timeout_str) = config_map.get("fetch_timeout_secs") {
            if let Ok(secs) = timeout_str.parse::<u64>() {
                if secs > 0 {
                    settings.fetch_timeout_secs = secs;
                }
            }
        }

        Ok(settings)
    }

    fn apply_access_token(&mut self, token: &str) {
        let token = token.trim();
        if !token.is_empty() {
            self.access_token = Some(token.to_string());
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn config_path() -> PathBuf {
        let mut path = std::env::current_exe()
            .unwrap_or_default()
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        if path.ends_with("target/debug") || path.ends_with("target/release") {
            path.pop();
            path.pop();
        }
        path.push("quakemap.ini");
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.ini")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.port, 3001);
        assert_eq!(settings.fetch_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn reads_values_and_ignores_junk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# QuakeMap Configuration File").unwrap();
        writeln!(file, "port = 8088").unwrap();
        writeln!(file, "event_feed_url = \"https://example.org/quakes.geojson\"").unwrap();
        writeln!(file, "access_token = pk.abc").unwrap();
        writeln!(file, "fetch_timeout_secs = soon").unwrap();
        writeln!(file, "not a setting").unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.port, 8088);
        assert_eq!(settings.event_feed_url, "https://example.org/quakes.geojson");
        assert_eq!(settings.boundary_feed_url, DEFAULT_BOUNDARY_FEED_URL);
        assert_eq!(settings.access_token.as_deref(), Some("pk.abc"));
        assert_eq!(settings.fetch_timeout_secs, DEFAULT_FETCH_TIMEOUT_SECS);
    }

    #[test]
    fn blank_token_stays_unset() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "access_token =").unwrap();
        writeln!(file, "fetch_timeout_secs = 0").unwrap();

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.access_token, None);
        assert_eq!(settings.fetch_timeout_secs, DEFAULT_FETCH_TIMEOUT_SECS);
    }

    #[test]
    fn token_is_not_serialized() {
        let settings = Settings {
            access_token: Some("secret".into()),
            ..Settings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("secret"));
    }
}
