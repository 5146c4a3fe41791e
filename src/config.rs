use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, ensure};

use crate::dashboards::DashboardSelection;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";
pub const DEFAULT_FILE_LOG: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubSettings {
    pub bind_addr: String,
    pub initial_dashboard: DashboardSelection,
    pub log_dir: Option<PathBuf>,
    pub file_log: String,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_owned(),
            initial_dashboard: DashboardSelection::default(),
            log_dir: None,
            file_log: DEFAULT_FILE_LOG.to_owned(),
        }
    }
}

impl HubSettings {
    pub fn from_env() -> Result<Self> {
        // Load .env if present, but do not fail if file does not exist.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let bind_addr = lookup("HUB_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned());
        ensure!(!bind_addr.trim().is_empty(), "HUB_BIND_ADDR cannot be empty");

        let defaults = DashboardSelection::default();
        let folder_id = parse_u32(&lookup, "HUB_INITIAL_FOLDER", defaults.folder_id)?;
        let dashboard_id = parse_u32(&lookup, "HUB_INITIAL_DASHBOARD", defaults.dashboard_id)?;

        let log_dir = read_optional(&lookup, "HUB_LOG_DIR").map(PathBuf::from);

        let file_log = lookup("HUB_FILE_LOG").unwrap_or_else(|| DEFAULT_FILE_LOG.to_owned());
        ensure!(!file_log.trim().is_empty(), "HUB_FILE_LOG cannot be empty");

        Ok(Self {
            bind_addr: bind_addr.trim().to_owned(),
            initial_dashboard: DashboardSelection::new(folder_id, dashboard_id),
            log_dir,
            file_log: file_log.trim().to_owned(),
        })
    }
}

fn read_optional(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        }
    })
}

fn parse_u32(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: u32) -> Result<u32> {
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .with_context(|| format!("failed to parse {name} as u32")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use super::{DEFAULT_BIND_ADDR, HubSettings};
    use crate::dashboards::DashboardSelection;

    fn settings_from(pairs: &[(&str, &str)]) -> anyhow::Result<HubSettings> {
        let vars = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect::<HashMap<_, _>>();
        HubSettings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let settings = settings_from(&[]).expect("defaults should load");
        assert_eq!(settings, HubSettings::default());
        assert_eq!(settings.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(settings.initial_dashboard, DashboardSelection::new(1, 1));
    }

    #[test]
    fn reads_overrides() {
        let settings = settings_from(&[
            ("HUB_BIND_ADDR", " 0.0.0.0:9000 "),
            ("HUB_INITIAL_FOLDER", "3"),
            ("HUB_INITIAL_DASHBOARD", "5"),
            ("HUB_LOG_DIR", "/tmp/hub-logs"),
            ("HUB_FILE_LOG", "debug"),
        ])
        .expect("overrides should load");
        assert_eq!(settings.bind_addr, "0.0.0.0:9000");
        assert_eq!(settings.initial_dashboard, DashboardSelection::new(3, 5));
        assert_eq!(settings.log_dir, Some(PathBuf::from("/tmp/hub-logs")));
        assert_eq!(settings.file_log, "debug");
    }

    #[test]
    fn blank_log_dir_is_ignored() {
        let settings = settings_from(&[("HUB_LOG_DIR", "   ")]).expect("should load");
        assert_eq!(settings.log_dir, None);
    }

    #[test]
    fn rejects_invalid_values() {
        let error = settings_from(&[("HUB_INITIAL_FOLDER", "first")])
            .expect_err("non-numeric folder should fail");
        assert!(error.to_string().contains("HUB_INITIAL_FOLDER"));

        let error = settings_from(&[("HUB_BIND_ADDR", "  ")]).expect_err("blank bind should fail");
        assert!(error.to_string().contains("HUB_BIND_ADDR"));
    }
}
