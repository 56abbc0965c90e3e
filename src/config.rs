//! Gauge and runtime configuration.
//!
//! Every option has a default, so an empty YAML document is a valid
//! configuration. Values are checked by [`GaugeConfig::validate`] before the
//! gauge is built.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::gauge::{
    DEFAULT_GREEN_BREAKPOINT, DEFAULT_REDLINE_FLASH_ABOVE, DEFAULT_YELLOW_BREAKPOINT,
};
use crate::{Result, TelemetryError};

/// Default UDP bind address (Codemasters telemetry port).
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:20777";

/// Telemetry silence before the gauge returns to idle, in seconds.
pub const DEFAULT_IDLE_TIMEOUT_SECONDS: f32 = 5.0;

/// Options consumed by the gauge state machine and animation drivers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaugeConfig {
    /// Global LED brightness factor in [0, 1]
    pub led_ring_brightness: f32,
    /// Levels below this are green
    pub led_green_breakpoint: f32,
    /// Levels below this (and at or above the green breakpoint) are yellow
    pub led_yellow_breakpoint: f32,
    /// Levels at or above this flash red
    pub led_redline_flash_above: f32,
    /// Breathe the ring while idle instead of switching it off
    pub allow_idle_animations: bool,
    /// Telemetry silence before the gauge returns to idle
    pub idle_timeout_seconds: f32,
    /// Run a full-scale sweep on start-up
    pub startup_sweep: bool,
    /// Number of LEDs on the ring
    pub ring_pixels: usize,
}

impl Default for GaugeConfig {
    fn default() -> Self {
        Self {
            led_ring_brightness: 0.3,
            led_green_breakpoint: DEFAULT_GREEN_BREAKPOINT,
            led_yellow_breakpoint: DEFAULT_YELLOW_BREAKPOINT,
            led_redline_flash_above: DEFAULT_REDLINE_FLASH_ABOVE,
            allow_idle_animations: true,
            idle_timeout_seconds: DEFAULT_IDLE_TIMEOUT_SECONDS,
            startup_sweep: true,
            ring_pixels: 24,
        }
    }
}

impl GaugeConfig {
    pub fn validate(&self) -> Result<()> {
        unit_interval("led_ring_brightness", self.led_ring_brightness)?;
        finite("led_green_breakpoint", self.led_green_breakpoint)?;
        finite("led_yellow_breakpoint", self.led_yellow_breakpoint)?;
        finite("led_redline_flash_above", self.led_redline_flash_above)?;

        if self.led_green_breakpoint > self.led_yellow_breakpoint {
            return Err(TelemetryError::config(
                "led_green_breakpoint",
                format!(
                    "{} is above led_yellow_breakpoint {}",
                    self.led_green_breakpoint, self.led_yellow_breakpoint
                ),
            ));
        }

        if !(self.idle_timeout_seconds.is_finite() && self.idle_timeout_seconds > 0.0) {
            return Err(TelemetryError::config(
                "idle_timeout_seconds",
                format!("{} must be a positive number of seconds", self.idle_timeout_seconds),
            ));
        }

        if self.ring_pixels == 0 {
            return Err(TelemetryError::config("ring_pixels", "ring must have at least one LED"));
        }

        Ok(())
    }

    /// Idle timeout as a duration.
    ///
    /// A negative, NaN or overflowing value falls back to the default timeout.
    pub fn idle_timeout(&self) -> Duration {
        Duration::try_from_secs_f32(self.idle_timeout_seconds)
            .unwrap_or(Duration::from_secs_f32(DEFAULT_IDLE_TIMEOUT_SECONDS))
    }
}

/// Full application configuration: network binding plus gauge options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local address the telemetry socket binds to
    pub bind_address: String,
    #[serde(flatten)]
    pub gauge: GaugeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self { bind_address: DEFAULT_BIND_ADDRESS.to_string(), gauge: GaugeConfig::default() }
    }
}

impl Config {
    /// Parse and validate a YAML configuration document.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml_ng::from_str(yaml).map_err(|e| TelemetryError::Parse {
                context: "configuration".to_string(),
                details: e.to_string(),
            })?
        };
        config.gauge.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| TelemetryError::file_error(path.to_path_buf(), e))?;
        Self::from_yaml(&yaml)
    }
}

fn finite(field: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(TelemetryError::config(field, format!("{value} is not a finite number")))
    }
}

fn unit_interval(field: &str, value: f32) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TelemetryError::config(field, format!("{value} is outside [0, 1]")))
    }
}
