use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveTime;
use dotenvy::dotenv;

use crate::sync::resolver::StatusCodes;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_addr: String,
    pub api_prefix: String,

    // Rate limiting
    pub rate_sync_per_min: u32,
    pub rate_protected_per_min: u32,

    // Terminals
    pub device_connect_timeout: Duration,
    pub device_probe_timeout: Duration,

    // Reconciliation
    pub status_codes: StatusCodes,
    pub sync_note: String,
    pub sync_daily_at: Option<NaiveTime>,
    pub identity_cache_ttl: Duration,

    pub log_dir: String,
    pub run_migrations: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let status_codes = StatusCodes {
            in_codes: parse_codes("SYNC_IN_STATUS_CODES", &var("SYNC_IN_STATUS_CODES", "0,1"))?,
            out_codes: parse_codes("SYNC_OUT_STATUS_CODES", &var("SYNC_OUT_STATUS_CODES", "2,4,5,15"))?,
        };
        if let Some(code) = status_codes
            .in_codes
            .iter()
            .find(|c| status_codes.out_codes.contains(c))
        {
            bail!("status code {code} is listed as both in and out");
        }

        let sync_daily_at = match lookup("SYNC_DAILY_AT").filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(
                NaiveTime::parse_from_str(raw.trim(), "%H:%M")
                    .with_context(|| format!("SYNC_DAILY_AT must be HH:MM, got {raw:?}"))?,
            ),
            None => None,
        };

        Ok(Self {
            database_url: lookup("DATABASE_URL").ok_or_else(|| anyhow!("DATABASE_URL must be set"))?,
            server_addr: var("SERVER_ADDR", "127.0.0.1:8080"),
            api_prefix: var("API_PREFIX", "/api"),

            rate_sync_per_min: parse_var("RATE_SYNC_PER_MIN", &var("RATE_SYNC_PER_MIN", "6"))?,
            rate_protected_per_min: parse_var(
                "RATE_PROTECTED_PER_MIN",
                &var("RATE_PROTECTED_PER_MIN", "1000"),
            )?,

            device_connect_timeout: Duration::from_secs(parse_var(
                "DEVICE_CONNECT_TIMEOUT_SECS",
                &var("DEVICE_CONNECT_TIMEOUT_SECS", "10"),
            )?),
            device_probe_timeout: Duration::from_secs(parse_var(
                "DEVICE_PROBE_TIMEOUT_SECS",
                &var("DEVICE_PROBE_TIMEOUT_SECS", "5"),
            )?),

            status_codes,
            sync_note: var("SYNC_NOTE", "Synced via Device"),
            sync_daily_at,
            identity_cache_ttl: Duration::from_secs(parse_var(
                "IDENTITY_CACHE_TTL_SECS",
                &var("IDENTITY_CACHE_TTL_SECS", "3600"),
            )?),

            log_dir: var("LOG_DIR", "logs"),
            run_migrations: parse_var("RUN_MIGRATIONS", &var("RUN_MIGRATIONS", "false"))?,
        })
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("{key} has an invalid value {raw:?}"))
}

fn parse_codes(key: &str, raw: &str) -> Result<Vec<i32>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_var(key, s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply() {
        let config = config(&[("DATABASE_URL", "mysql://hr@localhost/hr")]).unwrap();

        assert_eq!(config.server_addr, "127.0.0.1:8080");
        assert_eq!(config.device_connect_timeout, Duration::from_secs(10));
        assert_eq!(config.device_probe_timeout, Duration::from_secs(5));
        assert_eq!(config.status_codes, StatusCodes::default());
        assert_eq!(config.sync_note, "Synced via Device");
        assert_eq!(config.sync_daily_at, None);
        assert!(!config.run_migrations);
    }

    #[test]
    fn database_url_is_required() {
        let err = config(&[]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn status_codes_are_configurable() {
        let config = config(&[
            ("DATABASE_URL", "mysql://hr@localhost/hr"),
            ("SYNC_IN_STATUS_CODES", " 0, 1 ,3"),
            ("SYNC_OUT_STATUS_CODES", "15"),
        ])
        .unwrap();

        assert_eq!(config.status_codes.in_codes, vec![0, 1, 3]);
        assert_eq!(config.status_codes.out_codes, vec![15]);
    }

    #[test]
    fn overlapping_status_codes_are_rejected() {
        let err = config(&[
            ("DATABASE_URL", "mysql://hr@localhost/hr"),
            ("SYNC_OUT_STATUS_CODES", "1,15"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("status code 1"));
    }

    #[test]
    fn bad_numbers_name_the_key() {
        let err = config(&[
            ("DATABASE_URL", "mysql://hr@localhost/hr"),
            ("DEVICE_CONNECT_TIMEOUT_SECS", "ten"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("DEVICE_CONNECT_TIMEOUT_SECS"));
    }

    #[test]
    fn daily_schedule_is_parsed() {
        let config = config(&[
            ("DATABASE_URL", "mysql://hr@localhost/hr"),
            ("SYNC_DAILY_AT", "02:30"),
        ])
        .unwrap();
        assert_eq!(config.sync_daily_at, NaiveTime::from_hms_opt(2, 30, 0));
    }
}
