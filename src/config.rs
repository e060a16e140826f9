use anyhow::{Context, Result};
use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use std::env;
use std::str::FromStr;

use crate::models::{ActivityLevel, MacroGoals, UserProfile};

pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-scout:free";
pub const DEFAULT_API_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone)]
pub struct Config {
    /// Enables the OpenRouter vision recognizer when set.
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: String,
    pub simulate_latency: bool,
    pub api_addr: String,
    pub timezone: Tz,
    pub profile: UserProfile,
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: '{}'", key, value)),
        None => Ok(default),
    }
}

impl Config {
    /// Reads configuration from the process environment (after `.env`).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let openrouter_api_key = lookup("OPENROUTER_API_KEY").filter(|k| !k.trim().is_empty());
        let openrouter_model = lookup("OPENROUTER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let simulate_latency = lookup("SIMULATE_LATENCY")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let api_addr = lookup("API_ADDR").unwrap_or_else(|| DEFAULT_API_ADDR.to_string());

        let timezone = match lookup("USER_TIMEZONE") {
            Some(tz) => tz
                .trim()
                .parse::<Tz>()
                .map_err(|e| anyhow::anyhow!("USER_TIMEZONE is not a valid IANA timezone: {}", e))?,
            None => chrono_tz::UTC,
        };

        let activity_level = match lookup("PROFILE_ACTIVITY_LEVEL") {
            Some(level) => ActivityLevel::from_string(&level)
                .with_context(|| format!("PROFILE_ACTIVITY_LEVEL has an invalid value: '{}'", level))?,
            None => ActivityLevel::Moderate,
        };

        let profile = UserProfile {
            id: "1".to_string(),
            name: lookup("PROFILE_NAME").unwrap_or_else(|| "Athlete".to_string()),
            age: parse_or(&lookup, "PROFILE_AGE", 28)?,
            weight_lb: parse_or(&lookup, "PROFILE_WEIGHT_LB", 180.0)?,
            height_in: parse_or(&lookup, "PROFILE_HEIGHT_IN", 72.0)?,
            activity_level,
            goals: MacroGoals {
                calories: parse_or(&lookup, "DAILY_CALORIE_GOAL", 2200.0)?,
                protein: parse_or(&lookup, "DAILY_PROTEIN_GOAL", 150.0)?,
                carbs: parse_or(&lookup, "DAILY_CARB_GOAL", 220.0)?,
                fat: parse_or(&lookup, "DAILY_FAT_GOAL", 75.0)?,
            },
        };

        Ok(Self {
            openrouter_api_key,
            openrouter_model,
            simulate_latency,
            api_addr,
            timezone,
            profile,
        })
    }

    /// Hour of day in the user's timezone.
    pub fn local_hour(&self, now: DateTime<Utc>) -> u32 {
        now.with_timezone(&self.timezone).hour()
    }

    /// Calendar date (YYYY-MM-DD) in the user's timezone.
    pub fn local_date(&self, now: DateTime<Utc>) -> String {
        now.with_timezone(&self.timezone).format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(move |key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert!(config.openrouter_api_key.is_none());
        assert_eq!(config.openrouter_model, DEFAULT_MODEL);
        assert!(!config.simulate_latency);
        assert_eq!(config.api_addr, "0.0.0.0:8080");
        assert_eq!(config.profile.goals.calories, 2200.0);
        assert_eq!(config.profile.activity_level, ActivityLevel::Moderate);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("OPENROUTER_API_KEY", "sk-test"),
            ("SIMULATE_LATENCY", "true"),
            ("USER_TIMEZONE", "Europe/Istanbul"),
            ("PROFILE_WEIGHT_LB", "150.5"),
            ("PROFILE_ACTIVITY_LEVEL", "very_active"),
        ])
        .unwrap();

        assert_eq!(config.openrouter_api_key.as_deref(), Some("sk-test"));
        assert!(config.simulate_latency);
        assert_eq!(config.profile.weight_lb, 150.5);
        assert_eq!(config.profile.activity_level, ActivityLevel::VeryActive);

        let now = Utc.with_ymd_and_hms(2026, 10, 18, 22, 30, 0).unwrap();
        assert_eq!(config.local_hour(now), 1);
        assert_eq!(config.local_date(now), "2026-10-19");
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let config = config_from(&[("OPENROUTER_API_KEY", "  ")]).unwrap();
        assert!(config.openrouter_api_key.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(config_from(&[("USER_TIMEZONE", "Mars/Olympus")]).is_err());
        assert!(config_from(&[("PROFILE_AGE", "old")]).is_err());
        assert!(config_from(&[("PROFILE_ACTIVITY_LEVEL", "lazy")]).is_err());
    }
}
