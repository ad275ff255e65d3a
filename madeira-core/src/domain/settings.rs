use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

/// User preferences. Fields missing from a stored blob fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub email_notifications: bool,
    pub dark_mode: bool,
    pub auto_backup: bool,
    pub unit_system: String,
    pub number_format: String,
    pub push_notifications: bool,
    pub backup_reminders: bool,
    pub cloud_sync: bool,
    pub backup_frequency: String,
    pub debug_mode: bool,
    pub performance_mode: bool,
    pub experimental_features: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            dark_mode: false,
            auto_backup: true,
            unit_system: "metric".to_string(),
            number_format: "pt-BR".to_string(),
            push_notifications: true,
            backup_reminders: true,
            cloud_sync: true,
            backup_frequency: "daily".to_string(),
            debug_mode: false,
            performance_mode: false,
            experimental_features: false,
        }
    }
}

const UNIT_SYSTEMS: &[&str] = &["metric", "imperial"];
const BACKUP_FREQUENCIES: &[&str] = &["daily", "weekly", "monthly"];

impl Settings {
    /// Sets one field from its text form. Accepts snake_case or camelCase keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), DomainError> {
        let normalized: String = key
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "emailnotifications" => self.email_notifications = parse_bool(key, value)?,
            "darkmode" => self.dark_mode = parse_bool(key, value)?,
            "autobackup" => self.auto_backup = parse_bool(key, value)?,
            "unitsystem" => self.unit_system = parse_choice(key, value, UNIT_SYSTEMS)?,
            "numberformat" => self.number_format = value.trim().to_string(),
            "pushnotifications" => self.push_notifications = parse_bool(key, value)?,
            "backupreminders" => self.backup_reminders = parse_bool(key, value)?,
            "cloudsync" => self.cloud_sync = parse_bool(key, value)?,
            "backupfrequency" => {
                self.backup_frequency = parse_choice(key, value, BACKUP_FREQUENCIES)?
            }
            "debugmode" => self.debug_mode = parse_bool(key, value)?,
            "performancemode" => self.performance_mode = parse_bool(key, value)?,
            "experimentalfeatures" => self.experimental_features = parse_bool(key, value)?,
            _ => {
                return Err(DomainError::Validation(format!("unknown setting: {key}")));
            }
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, DomainError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(DomainError::Validation(format!(
            "{key} expects true or false, got {value}"
        ))),
    }
}

fn parse_choice(key: &str, value: &str, allowed: &[&str]) -> Result<String, DomainError> {
    let value = value.trim().to_lowercase();
    if allowed.contains(&value.as_str()) {
        Ok(value)
    } else {
        Err(DomainError::Validation(format!(
            "{key} must be one of {}",
            allowed.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_blob_merges_over_defaults() {
        let stored: Settings = serde_json::from_str(r#"{"darkMode": true}"#).unwrap();
        assert!(stored.dark_mode);
        assert!(stored.email_notifications);
        assert_eq!(stored.backup_frequency, "daily");
    }

    #[test]
    fn set_accepts_both_key_styles() {
        let mut settings = Settings::default();
        settings.set("dark_mode", "on").unwrap();
        settings.set("backupFrequency", "Weekly").unwrap();
        assert!(settings.dark_mode);
        assert_eq!(settings.backup_frequency, "weekly");
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut settings = Settings::default();
        assert!(settings.set("darkMode", "maybe").is_err());
        assert!(settings.set("unitSystem", "cubits").is_err());
        assert!(settings.set("colour", "red").is_err());
    }
}
