use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    geocode::DEFAULT_GEOCODING_URL, locate::DEFAULT_IP_LOOKUP_URL, model::Coordinates,
    provider::LocationSource, render::OutputFormat, weather::DEFAULT_FORECAST_URL,
};

/// How "use my location" finds a position.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LocationConfig {
    /// "ip", "fixed" or "none". Unset means "ip".
    pub provider: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Override for the IP lookup service.
    pub ip_lookup_url: Option<String>,
}

impl LocationConfig {
    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.latitude?, self.longitude?))
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// format = "text"
///
/// [location]
/// provider = "fixed"
/// latitude = 59.91
/// longitude = 10.75
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub geocoding_url: Option<String>,
    pub forecast_url: Option<String>,
    pub format: Option<OutputFormat>,
    #[serde(default)]
    pub location: LocationConfig,
}

impl Config {
    pub fn geocoding_url(&self) -> &str {
        self.geocoding_url.as_deref().unwrap_or(DEFAULT_GEOCODING_URL)
    }

    pub fn forecast_url(&self) -> &str {
        self.forecast_url.as_deref().unwrap_or(DEFAULT_FORECAST_URL)
    }

    pub fn ip_lookup_url(&self) -> &str {
        self.location.ip_lookup_url.as_deref().unwrap_or(DEFAULT_IP_LOOKUP_URL)
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }

    /// The configured position source as a strongly-typed value.
    pub fn location_source(&self) -> Result<LocationSource> {
        match self.location.provider.as_deref() {
            None => Ok(LocationSource::default()),
            Some(s) => LocationSource::try_from(s),
        }
    }

    pub fn set_location_source(&mut self, source: LocationSource) {
        self.location.provider = Some(source.as_str().to_string());
    }

    /// Switch to fixed coordinates.
    pub fn set_fixed_location(&mut self, at: Coordinates) {
        self.set_location_source(LocationSource::Fixed);
        self.location.latitude = Some(at.latitude);
        self.location.longitude = Some(at.longitude);
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "skylook", "skylook")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_public_services() {
        let cfg = Config::default();

        assert_eq!(cfg.geocoding_url(), "https://geocoding-api.open-meteo.com");
        assert_eq!(cfg.forecast_url(), "https://api.open-meteo.com");
        assert_eq!(cfg.output_format(), OutputFormat::Text);
        assert_eq!(cfg.location_source().unwrap(), LocationSource::Ip);
    }

    #[test]
    fn unknown_location_source_is_rejected() {
        let mut cfg = Config::default();
        cfg.location.provider = Some("satellite".into());

        let err = cfg.location_source().unwrap_err();
        assert!(err.to_string().contains("Unknown location provider"));
    }

    #[test]
    fn set_fixed_location_sets_source_and_coordinates() {
        let mut cfg = Config::default();
        cfg.set_fixed_location(Coordinates::new(59.91, 10.75));

        assert_eq!(cfg.location_source().unwrap(), LocationSource::Fixed);
        assert_eq!(cfg.location.coordinates(), Some(Coordinates::new(59.91, 10.75)));
    }

    #[test]
    fn parses_toml() {
        let cfg: Config = toml::from_str(
            r#"
            format = "html"
            forecast_url = "http://localhost:8080"

            [location]
            provider = "none"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.output_format(), OutputFormat::Html);
        assert_eq!(cfg.forecast_url(), "http://localhost:8080");
        assert_eq!(cfg.location_source().unwrap(), LocationSource::None);
        assert_eq!(cfg.location.coordinates(), None);
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_fixed_location(Coordinates::new(-33.87, 151.21));
        cfg.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }
}
