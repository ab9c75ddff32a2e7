use crate::error::{FishcastError, Result};
use dialoguer::{Input, Password, Select};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_LATITUDE: f64 = 40.7128;
pub const DEFAULT_LONGITUDE: f64 = -74.0060;
pub const DEFAULT_NOAA_STATION: &str = "8518750";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub openweathermap: OpenWeatherMapConfig,
    #[serde(default)]
    pub tides: TideConfig,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct LocationConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl LocationConfig {
    /// Both coordinates, or nothing
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherApi {
    /// One Call 3.0, ships a ready-made daily forecast
    #[default]
    OneCall,
    /// Free 2.5 endpoints, 3-hour forecast bucketed into days
    Forecast,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct OpenWeatherMapConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub api: WeatherApi,
    #[serde(default = "default_weather_refresh_secs")]
    pub refresh_secs: u64,
}

fn default_weather_refresh_secs() -> u64 {
    600
}

impl OpenWeatherMapConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs.max(1))
    }
}

impl Default for OpenWeatherMapConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api: WeatherApi::default(),
            refresh_secs: default_weather_refresh_secs(),
        }
    }
}

impl std::fmt::Debug for OpenWeatherMapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherMapConfig")
            .field("api_key", &"[REDACTED]")
            .field("api", &self.api)
            .field("refresh_secs", &self.refresh_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TideApi {
    /// Coordinate-based extremes service
    #[default]
    WorldTides,
    /// NOAA CO-OPS station predictions
    Noaa,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct TideConfig {
    #[serde(default)]
    pub provider: TideApi,
    #[serde(default)]
    pub worldtides_api_key: Option<String>,
    #[serde(default = "default_noaa_station")]
    pub noaa_station: String,
    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: u32,
    #[serde(default = "default_tide_refresh_secs")]
    pub refresh_secs: u64,
}

fn default_noaa_station() -> String {
    DEFAULT_NOAA_STATION.to_string()
}

fn default_lookahead_days() -> u32 {
    7
}

fn default_tide_refresh_secs() -> u64 {
    3600
}

impl TideConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs.max(1))
    }
}

impl Default for TideConfig {
    fn default() -> Self {
        Self {
            provider: TideApi::default(),
            worldtides_api_key: None,
            noaa_station: default_noaa_station(),
            lookahead_days: default_lookahead_days(),
            refresh_secs: default_tide_refresh_secs(),
        }
    }
}

impl std::fmt::Debug for TideConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TideConfig")
            .field("provider", &self.provider)
            .field(
                "worldtides_api_key",
                &self.worldtides_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("noaa_station", &self.noaa_station)
            .field("lookahead_days", &self.lookahead_days)
            .field("refresh_secs", &self.refresh_secs)
            .finish()
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(FishcastError::Config(format!(
                "Config file not found at {:?}. Run `fishcast init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| FishcastError::Config(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&config_str)
    }

    /// Parse a config document after `${VAR}` substitution
    pub fn from_yaml(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content);
        serde_yaml::from_str(&content)
            .map_err(|e| FishcastError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let default_path = Self::default_config_path()?;
        Ok(default_path)
    }

    /// Returns true if a config file can be found in any standard location.
    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/fishcast/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| FishcastError::Config("Cannot determine config directory".into()))?
            .join("fishcast");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the loaded Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up fishcast!");
        println!();

        println!("Fishing spot");
        let latitude: f64 = Input::new()
            .with_prompt("  Latitude")
            .default(DEFAULT_LATITUDE)
            .interact_text()
            .map_err(|e| FishcastError::Config(format!("Input error: {}", e)))?;

        let longitude: f64 = Input::new()
            .with_prompt("  Longitude")
            .default(DEFAULT_LONGITUDE)
            .interact_text()
            .map_err(|e| FishcastError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("OpenWeatherMap");
        let api_key: String = Password::new()
            .with_prompt("  API key")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| FishcastError::Config(format!("Input error: {}", e)))?;

        let api_choice = Select::new()
            .with_prompt("  API")
            .items(&["One Call 3.0", "5-day / 3-hour forecast (2.5)"])
            .default(0)
            .interact()
            .map_err(|e| FishcastError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("Tides");
        let tide_choice = Select::new()
            .with_prompt("  Provider")
            .items(&["WorldTides (by coordinates)", "NOAA (by station)"])
            .default(0)
            .interact()
            .map_err(|e| FishcastError::Config(format!("Input error: {}", e)))?;

        let mut tides = TideConfig::default();
        if tide_choice == 0 {
            tides.provider = TideApi::WorldTides;
            let key: String = Password::new()
                .with_prompt("  WorldTides API key (blank for free tier)")
                .allow_empty_password(true)
                .interact()
                .map_err(|e| FishcastError::Config(format!("Input error: {}", e)))?;
            tides.worldtides_api_key = (!key.is_empty()).then_some(key);
        } else {
            tides.provider = TideApi::Noaa;
            tides.noaa_station = Input::new()
                .with_prompt("  NOAA station id")
                .default(DEFAULT_NOAA_STATION.to_string())
                .interact_text()
                .map_err(|e| FishcastError::Config(format!("Input error: {}", e)))?;
        }

        println!();

        let config = Config {
            location: LocationConfig {
                latitude: Some(latitude),
                longitude: Some(longitude),
            },
            openweathermap: OpenWeatherMapConfig {
                api_key,
                api: if api_choice == 0 {
                    WeatherApi::OneCall
                } else {
                    WeatherApi::Forecast
                },
                refresh_secs: default_weather_refresh_secs(),
            },
            tides,
        };

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| FishcastError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# fishcast configuration\n# Generated by `fishcast init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        let re = match regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") {
            Ok(re) => re,
            Err(_) => return result,
        };

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.openweathermap.refresh_secs, 600);
        assert_eq!(config.openweathermap.api, WeatherApi::OneCall);
        assert_eq!(config.tides.provider, TideApi::WorldTides);
        assert_eq!(config.tides.noaa_station, "8518750");
        assert_eq!(config.tides.lookahead_days, 7);
        assert_eq!(config.tides.refresh_secs, 3600);
        assert!(config.location.coordinates().is_none());
    }

    #[test]
    fn parses_full_document() {
        let yaml = r#"
location:
  latitude: 41.5
  longitude: -71.3
openweathermap:
  api_key: abc123
  api: forecast
tides:
  provider: noaa
  noaa_station: "8452660"
  refresh_secs: 1800
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.location.coordinates(), Some((41.5, -71.3)));
        assert_eq!(config.openweathermap.api_key, "abc123");
        assert_eq!(config.openweathermap.api, WeatherApi::Forecast);
        assert_eq!(config.tides.provider, TideApi::Noaa);
        assert_eq!(config.tides.noaa_station, "8452660");
        assert_eq!(config.tides.refresh_interval(), Duration::from_secs(1800));
    }

    #[test]
    fn substitutes_environment_variables() {
        std::env::set_var("FISHCAST_TEST_OWM_KEY", "from-env");
        let config =
            Config::from_yaml("openweathermap:\n  api_key: ${FISHCAST_TEST_OWM_KEY}\n").unwrap();
        assert_eq!(config.openweathermap.api_key, "from-env");
    }

    #[test]
    fn half_specified_location_has_no_coordinates() {
        let location = LocationConfig {
            latitude: Some(41.5),
            longitude: None,
        };
        assert!(location.coordinates().is_none());
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let config = Config::from_yaml(
            "openweathermap:\n  api_key: secret-key\ntides:\n  worldtides_api_key: tide-secret\n",
        )
        .unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-key"));
        assert!(!debug.contains("tide-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn unknown_provider_is_a_config_error() {
        let err = Config::from_yaml("tides:\n  provider: tidepool\n").unwrap_err();
        assert!(matches!(err, FishcastError::Config(_)));
    }
}
