use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::errors::StorageError;
use crate::models::Dataset;
use crate::reports::DEFAULT_OVERTIME_THRESHOLD;
use crate::rollups::WeekStart;
use crate::rounding::RoundingConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overtime_threshold_hours: Option<Decimal>,
    #[serde(default)]
    pub week_start: WeekStart,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounding: Option<RoundingConfig>,
}

impl Config {
    pub fn overtime_threshold(&self) -> Decimal {
        self.overtime_threshold_hours
            .unwrap_or(DEFAULT_OVERTIME_THRESHOLD)
    }
}

fn config_path() -> Option<PathBuf> {
    let mut path = dirs::home_dir()?;
    path.push(".ratesheet.json");
    Some(path)
}

/// Reads `~/.ratesheet.json`, falling back to defaults when absent or unreadable.
pub fn read_config() -> Config {
    config_path()
        .and_then(|path| read_config_from(&path))
        .unwrap_or_default()
}

pub fn write_config(config: &Config) -> Result<(), StorageError> {
    let path = config_path().ok_or(StorageError::HomeNotFound)?;
    write_config_to(&path, config)
}

pub fn write_overtime_threshold(value: Decimal) -> Result<(), StorageError> {
    let mut config = read_config();
    config.overtime_threshold_hours = Some(value);
    write_config(&config)
}

pub fn write_week_start(value: WeekStart) -> Result<(), StorageError> {
    let mut config = read_config();
    config.week_start = value;
    write_config(&config)
}

pub fn write_rounding(value: Option<RoundingConfig>) -> Result<(), StorageError> {
    let mut config = read_config();
    config.rounding = value;
    write_config(&config)
}

fn read_config_from(path: &Path) -> Option<Config> {
    let contents = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(config) => Some(config),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable config");
            None
        }
    }
}

fn write_config_to(path: &Path, config: &Config) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)?;
    debug!(path = %path.display(), "wrote config");
    Ok(())
}

/// Loads an organization snapshot exported by the persistence layer.
pub fn read_dataset(path: &Path) -> Result<Dataset, StorageError> {
    let contents = fs::read_to_string(path)?;
    let dataset: Dataset = serde_json::from_str(&contents)?;
    debug!(
        path = %path.display(),
        organization = %dataset.organization.id,
        users = dataset.users.len(),
        projects = dataset.projects.len(),
        entries = dataset.time_entries.len(),
        "loaded dataset"
    );
    Ok(dataset)
}
