//! Scheduler configuration structures and loaders.

use std::env;
use std::str::FromStr;

use tracing::warn;

/// Host frame phase a [`Launcher`](crate::Launcher) ticks its coroutines in.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ProcessMode {
    /// Variable-rate frame update.
    #[default]
    Idle,
    /// Fixed-rate physics update.
    Physics,
}

/// Scheduler settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SchedulerConfig {
    /// Purge finished tasks at the start of every tick.
    pub auto_clean: bool,
    pub mode: ProcessMode,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            auto_clean: true,
            mode: ProcessMode::Idle,
        }
    }
}

impl SchedulerConfig {
    pub const fn new(auto_clean: bool, mode: ProcessMode) -> Self {
        Self { auto_clean, mode }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `COROUTINE_AUTO_CLEAN` - Purge finished tasks every tick (default: true)
    /// - `COROUTINE_PROCESS_MODE` - `idle` or `physics` (default: idle)
    ///
    /// Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(auto_clean) = read_value(&lookup, "COROUTINE_AUTO_CLEAN", parse_bool) {
            config.auto_clean = auto_clean;
        }
        if let Some(mode) = read_value(&lookup, "COROUTINE_PROCESS_MODE", |raw| {
            ProcessMode::from_str(raw).ok()
        }) {
            config.mode = mode;
        }

        config
    }
}

fn read_value<T, F, P>(lookup: &F, key: &str, parse: P) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Option<T>,
{
    let raw = lookup(key)?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        warn!(key, value = %raw, "ignoring unparsable configuration value");
    }
    parsed
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
