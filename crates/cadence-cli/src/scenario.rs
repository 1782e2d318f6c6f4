//! Scenario files for `cadence simulate`

use anyhow::{Context, Result};
use cadence_runtime::RuntimeConfig;
use cadence_sched::{Phase, TokenConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Example written by `cadence init`
pub const EXAMPLE: &str = r#"# Cadence simulation scenario

[runtime]
fixed_hz = 50.0
max_frame_time = 0.25
max_fixed_steps = 8

# Ticks every Update
[[registrant]]
name = "heartbeat"
phase = "update"
kind = "counter"

# Throttled to once per second of engine time
[[registrant]]
name = "autosave"
phase = "late_update"
kind = "counter"
interval = 1.0

# Spawns a short-lived child every 25 fixed steps
[[registrant]]
name = "emitter"
phase = "fixed_update"
kind = "spawner"
every = 25
child_interval = 0.1
child_lifetime = 3

# Starts paused and never runs
[[registrant]]
name = "sleeper"
phase = "update"
kind = "counter"
paused = true

# Fails on every 120th invocation
[[registrant]]
name = "flaky"
phase = "update"
kind = "failing"
fail_every = 120
"#;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub runtime: RuntimeConfig,
    #[serde(default, rename = "registrant")]
    pub registrants: Vec<RegistrantSpec>,
}

/// One `[[registrant]]` entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrantSpec {
    pub name: String,
    pub phase: Phase,
    #[serde(default)]
    pub interval: f64,
    #[serde(default)]
    pub paused: bool,
    #[serde(flatten)]
    pub behavior: Behavior,
}

impl RegistrantSpec {
    pub fn token_config(&self) -> TokenConfig {
        TokenConfig {
            interval: self.interval,
            paused: self.paused,
            last_update: 0.0,
        }
    }
}

/// What a demo registrant does when invoked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Behavior {
    /// Counts invocations
    Counter,
    /// Removes itself after `lifetime` invocations
    Expiring { lifetime: u32 },
    /// Registers an expiring child every `every` invocations
    Spawner {
        every: u32,
        #[serde(default)]
        child_interval: f64,
        child_lifetime: u32,
    },
    /// Returns an error on every `fail_every`-th invocation
    Failing { fail_every: u32 },
}

impl Scenario {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("Invalid scenario {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let scenario: Scenario = toml::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        self.runtime.validate()?;
        let mut names = HashSet::new();
        for entry in &self.registrants {
            // Reports are keyed by name; spawned children take `parent#n`.
            if entry.name.contains('#') {
                anyhow::bail!("registrant '{}': '#' is reserved for spawned children", entry.name);
            }
            if !names.insert(entry.name.as_str()) {
                anyhow::bail!("duplicate registrant name '{}'", entry.name);
            }
            entry.token_config()
                .validate()
                .with_context(|| format!("registrant '{}'", entry.name))?;
            let zero = match entry.behavior {
                Behavior::Counter => false,
                Behavior::Expiring { lifetime } => lifetime == 0,
                Behavior::Spawner { every, .. } => every == 0,
                Behavior::Failing { fail_every } => fail_every == 0,
            };
            if zero {
                anyhow::bail!("registrant '{}': counts must be at least 1", entry.name);
            }
        }
        Ok(())
    }
}
