use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::Threshold;

use crate::{
    catalog::{DepartmentCatalog, DEFAULT_DEPARTMENT_CODE},
    controller::ControllerOptions,
    engine::DEFAULT_POPULATION_THRESHOLD,
    gateway::DEFAULT_API_BASE_URL,
};

pub const SETTINGS_FILE: &str = "communes.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub settle_delay_ms: u64,
    pub default_department: String,
    pub default_min_population: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout_secs: 10,
            settle_delay_ms: 1200,
            default_department: DEFAULT_DEPARTMENT_CODE.into(),
            default_min_population: Some(DEFAULT_POPULATION_THRESHOLD),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    settle_delay_ms: Option<u64>,
    default_department: Option<String>,
    default_min_population: Option<toml::Value>,
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn default_threshold(&self) -> Threshold {
        Threshold::from(self.default_min_population)
    }

    pub fn controller_options(&self, catalog: &DepartmentCatalog) -> ControllerOptions {
        ControllerOptions {
            default_department: Some(catalog.resolve(&self.default_department)),
            default_threshold: self.default_threshold(),
            settle_delay: self.settle_delay(),
        }
    }

    pub fn merge_toml(&mut self, raw: &str) -> anyhow::Result<()> {
        let file_cfg: FileSettings = toml::from_str(raw).context("invalid settings file")?;
        if let Some(v) = file_cfg.api_base_url {
            self.api_base_url = v;
        }
        if let Some(v) = file_cfg.request_timeout_secs.filter(|secs| *secs > 0) {
            self.request_timeout_secs = v;
        }
        if let Some(v) = file_cfg.settle_delay_ms {
            self.settle_delay_ms = v;
        }
        if let Some(v) = file_cfg.default_department {
            self.default_department = v;
        }
        match file_cfg.default_min_population {
            Some(toml::Value::Integer(v)) => {
                self.default_min_population = u64::try_from(v).ok();
            }
            Some(toml::Value::String(v)) => {
                self.default_min_population = Threshold::parse(&v).as_option();
            }
            _ => {}
        }
        Ok(())
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("COMMUNES_API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Some(v) = lookup("COMMUNES_REQUEST_TIMEOUT_SECS") {
            if let Ok(parsed @ 1..) = v.trim().parse::<u64>() {
                self.request_timeout_secs = parsed;
            }
        }
        if let Some(v) = lookup("COMMUNES_SETTLE_DELAY_MS") {
            if let Ok(parsed) = v.trim().parse::<u64>() {
                self.settle_delay_ms = parsed;
            }
        }
        if let Some(v) = lookup("COMMUNES_DEFAULT_DEPARTMENT") {
            self.default_department = v;
        }
        if let Some(v) = lookup("COMMUNES_DEFAULT_MIN_POPULATION") {
            self.default_min_population = Threshold::parse(&v).as_option();
        }
    }
}

/// Defaults, then `communes.toml` (or `path`), then `COMMUNES_*` variables.
/// A missing `communes.toml` is skipped; a missing explicit `path` is an error.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let file = match path {
        Some(path) => Some((
            path,
            fs::read_to_string(path).with_context(|| {
                format!("failed to read settings file '{}'", path.display())
            })?,
        )),
        None => {
            let path = Path::new(SETTINGS_FILE);
            fs::read_to_string(path).ok().map(|raw| (path, raw))
        }
    };

    if let Some((path, raw)) = file {
        settings
            .merge_toml(&raw)
            .with_context(|| format!("failed to load settings from '{}'", path.display()))?;
    }

    settings.apply_env_overrides(|key| std::env::var(key).ok());
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
