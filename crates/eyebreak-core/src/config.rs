use crate::error::ConfigError;
use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

/// Get the configuration directory for eyebreak.
///
/// # Errors
///
/// Returns an error if the user configuration directory cannot be determined.
pub fn get_config_dir() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Failed to get config dir"))?;
    path.push("eyebreak");
    Ok(path)
}

/// Default location of the configuration file
///
/// # Errors
///
/// Returns an error if the user configuration directory cannot be determined.
pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.toml"))
}

/// Convert minutes to seconds
#[must_use]
pub fn minutes(mins: f64) -> f64 {
    mins * 60.0
}

/// Startup options for the monitor, as written in `config.toml`
///
/// All durations are in seconds. Missing keys fall back to the defaults below,
/// which are short enough to try the tool out; raise them for daily use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// How long a new visibility value must persist before it is trusted
    pub confirmation_window: f64,
    /// Continuous presence before a break is owed
    pub time_before_break: f64,
    /// Continuous absence needed to satisfy an owed break
    pub break_time: f64,
    /// Maximum number of frames sampled per second
    pub frame_rate: f64,
    /// Emit state-transition notifications
    pub debug: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            confirmation_window: 5.0,
            time_before_break: minutes(0.5),
            break_time: minutes(0.5),
            frame_rate: 10.0,
            debug: true,
        }
    }
}

impl MonitorConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Load from `path` when given, otherwise from the default location.
    /// A missing default file yields the built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be read or parsed, or if an
    /// explicitly requested file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let default_path = default_config_path()?;
        if default_path.exists() {
            log::debug!("Loading config from {}", default_path.display());
            Self::load(&default_path)
        } else {
            log::debug!("No config file at {}, using defaults", default_path.display());
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this structure.
    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Render the configuration as TOML
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every option and convert to the durations the core works with
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any duration or the frame rate is not a
    /// positive finite number.
    pub fn validate(&self) -> Result<MonitorSettings, ConfigError> {
        let confirmation_window = positive_duration("confirmation_window", self.confirmation_window)?;
        let time_before_break = positive_duration("time_before_break", self.time_before_break)?;
        let break_time = positive_duration("break_time", self.break_time)?;

        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(ConfigError::InvalidFrameRate(self.frame_rate));
        }

        Ok(MonitorSettings {
            confirmation_window,
            time_before_break,
            break_time,
            frame_interval: seconds_to_duration(1.0 / self.frame_rate),
            debug: self.debug,
        })
    }
}

/// Validated configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub confirmation_window: Duration,
    pub time_before_break: Duration,
    pub break_time: Duration,
    /// Minimum spacing between two sampled frames
    pub frame_interval: Duration,
    pub debug: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            confirmation_window: Duration::seconds(5),
            time_before_break: Duration::seconds(30),
            break_time: Duration::seconds(30),
            frame_interval: Duration::milliseconds(100),
            debug: true,
        }
    }
}

fn positive_duration(name: &'static str, value: f64) -> Result<Duration, ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::NonPositiveDuration { name, value });
    }
    let duration = seconds_to_duration(value);
    // Sub-microsecond values would round down to nothing
    if duration <= Duration::zero() {
        return Err(ConfigError::NonPositiveDuration { name, value });
    }
    Ok(duration)
}

/// Convert fractional seconds to a duration with microsecond precision
#[must_use]
pub fn seconds_to_duration(seconds: f64) -> Duration {
    #[allow(clippy::cast_possible_truncation)]
    let micros = (seconds * 1_000_000.0).round() as i64;
    Duration::microseconds(micros)
}
