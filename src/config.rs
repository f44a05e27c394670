//! Layered settings: defaults, an optional config file, then environment.
//!
//! ```toml
//! refresh_ms = 250
//!
//! [chart_limits]
//! pie = 20
//!
//! [filter]
//! instance = "web-1"
//! ```
//!
//! Environment variables use the `ROUTEWATCH_` prefix with `__` between
//! nested keys, e.g. `ROUTEWATCH_CHART_LIMITS__AREA=3`.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::{ChartLimits, Selection};

/// Default interval between polls of a real-time source.
const DEFAULT_REFRESH_MS: u64 = 500;

/// Initial filter selection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub route: Option<String>,
    pub instance: Option<String>,
    pub status_code: Option<String>,
}

impl FilterSettings {
    pub fn selection(&self) -> Selection {
        Selection::new(
            self.route.as_deref(),
            self.instance.as_deref(),
            self.status_code.as_deref(),
        )
    }
}

/// Application settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Milliseconds between polls of a real-time source.
    pub refresh_ms: u64,
    pub chart_limits: ChartLimits,
    pub filter: FilterSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refresh_ms: DEFAULT_REFRESH_MS,
            chart_limits: ChartLimits::default(),
            filter: FilterSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        builder = builder.add_source(
            Environment::with_prefix("ROUTEWATCH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        Ok(settings)
    }

    /// Poll interval for real-time sources, never shorter than 1ms.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_ms.max(1))
    }
}
