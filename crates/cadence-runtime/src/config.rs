//! Runtime loop configuration

use cadence_core::{CadenceError, Result, Seconds};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for [`FrameDriver`](crate::FrameDriver).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Fixed-step rate in Hz
    #[serde(default = "default_fixed_hz")]
    pub fixed_hz: f64,
    /// Frame times above this are clamped (seconds)
    #[serde(default = "default_max_frame_time")]
    pub max_frame_time: Seconds,
    /// Upper bound on fixed steps per frame; leftover time is dropped
    #[serde(default = "default_max_fixed_steps")]
    pub max_fixed_steps: u32,
    /// Return the first phase failure instead of logging it and continuing
    #[serde(default)]
    pub stop_on_error: bool,
}

fn default_fixed_hz() -> f64 {
    60.0
}

fn default_max_frame_time() -> Seconds {
    0.25
}

fn default_max_fixed_steps() -> u32 {
    8
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            fixed_hz: default_fixed_hz(),
            max_frame_time: default_max_frame_time(),
            max_fixed_steps: default_max_fixed_steps(),
            stop_on_error: false,
        }
    }
}

impl RuntimeConfig {
    /// Load and validate a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: RuntimeConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.fixed_hz.is_finite() && self.fixed_hz > 0.0) {
            return Err(CadenceError::Config(format!(
                "fixed_hz must be positive, got {}",
                self.fixed_hz
            )));
        }
        if !(self.max_frame_time.is_finite() && self.max_frame_time > 0.0) {
            return Err(CadenceError::Config(format!(
                "max_frame_time must be positive, got {}",
                self.max_frame_time
            )));
        }
        if self.max_fixed_steps == 0 {
            return Err(CadenceError::Config(
                "max_fixed_steps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn fixed_timestep(&self) -> Seconds {
        1.0 / self.fixed_hz
    }
}
