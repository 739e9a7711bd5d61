use chrono_tz::Tz;
use std::path::PathBuf;
use thiserror::Error;

pub const DEFAULT_ALLOWED_STICKER_SETS: [&str; 2] = ["Piggy2019", "vinki"];
pub const DEFAULT_TIME_ZONE: Tz = chrono_tz::America::Argentina::Buenos_Aires;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown time zone: {0}")]
    TimeZone(String),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Where ledgers and sticker memory live
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    Files { data_dir: PathBuf },
    Postgres { database_url: String },
}

/// Engine settings, threaded explicitly into the engine instead of living in globals
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub allowed_sticker_sets: Vec<String>,
    /// Reply with diagnostics for unparsable text and every credit
    pub verbose: bool,
    pub time_zone: Tz,
    pub storage: StorageConfig,
    pub bind_addr: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allowed_sticker_sets: DEFAULT_ALLOWED_STICKER_SETS
                .iter()
                .map(|set| set.to_string())
                .collect(),
            verbose: false,
            time_zone: DEFAULT_TIME_ZONE,
            storage: StorageConfig::Files {
                data_dir: PathBuf::from("."),
            },
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl EngineConfig {
    /// Loads from the process environment, reading a `.env` file first when present
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let allowed_sticker_sets = match lookup("ALLOWED_STICKER_SETS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|set| !set.is_empty())
                .map(str::to_string)
                .collect(),
            None => defaults.allowed_sticker_sets,
        };

        let verbose = match lookup("VERBOSE") {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::Invalid {
                key: "VERBOSE",
                value: raw,
            })?,
            None => defaults.verbose,
        };

        let time_zone = match lookup("TIME_ZONE") {
            Some(raw) => raw.parse::<Tz>().map_err(|_| ConfigError::TimeZone(raw))?,
            None => defaults.time_zone,
        };

        let storage = match (lookup("DATABASE_URL"), lookup("DATA_DIR")) {
            (Some(database_url), _) if !database_url.is_empty() => {
                StorageConfig::Postgres { database_url }
            }
            (_, Some(data_dir)) => StorageConfig::Files {
                data_dir: PathBuf::from(data_dir),
            },
            _ => defaults.storage,
        };

        Ok(Self {
            allowed_sticker_sets,
            verbose,
            time_zone,
            storage,
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
