//! Application configuration, read from a TOML file.
//!
//! ```toml
//! [database]
//! backend = "sqlite"
//! connection_string = "itbi.db"
//!
//! [logging]
//! level = "debug"
//! file = "itbi.log"
//!
//! [rates]
//! SP = "3.0"
//! RJ = 2
//! ```
//!
//! Every section is optional. `[rates]` entries override the built-in state
//! table; states not listed keep their default rate.
//!
//! The file is looked up in this order:
//!
//! | Source | Missing file |
//! |--------|--------------|
//! | `--config <path>` | error |
//! | `ITBI_CONFIG` environment variable | error |
//! | `itbi.toml` in the working directory | defaults |

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use itbi_core::{RateTable, StateCode, db::DbConfig};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const CONFIG_ENV: &str = "ITBI_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "itbi.toml";
pub const DEFAULT_DATABASE: &str = "itbi.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("unknown state '{0}' in [rates]")]
    UnknownState(String),

    #[error("rate for {state} must be greater than 0 and at most 100, got {rate}")]
    InvalidRate { state: StateCode, rate: Decimal },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: String,
    pub connection_string: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: "sqlite".to_string(),
            connection_string: DEFAULT_DATABASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Bare level or full `EnvFilter` directive.
    pub level: Option<String>,

    /// Log file, appended to. Its directory must exist.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,

    /// Rate overrides keyed by UF, as percentages.
    pub rates: BTreeMap<String, Decimal>,
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    /// Loads the configuration from the first source that names a file.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        match resolve_config_path(explicit, from_env, Path::new(DEFAULT_CONFIG_FILE)) {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Replaces the database settings with any values given on the command line.
    pub fn override_database(
        &mut self,
        backend: Option<String>,
        connection_string: Option<String>,
    ) {
        if let Some(backend) = backend {
            self.database.backend = backend;
        }
        if let Some(connection_string) = connection_string {
            self.database.connection_string = connection_string;
        }
    }

    pub fn db_config(&self) -> DbConfig {
        DbConfig {
            backend: self.database.backend.clone(),
            connection_string: self.database.connection_string.clone(),
        }
    }

    /// The built-in state table with `[rates]` applied on top.
    pub fn rate_table(&self) -> Result<RateTable, ConfigError> {
        let mut table = RateTable::brazil_default();
        for (key, &rate) in &self.rates {
            let state =
                StateCode::parse(key).ok_or_else(|| ConfigError::UnknownState(key.clone()))?;
            if rate <= Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
                return Err(ConfigError::InvalidRate { state, rate });
            }
            table.set_rate(state, rate);
        }
        Ok(table)
    }
}

/// Picks the config file: explicit path, then the environment, then
/// `default` only when it exists.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    from_env: Option<PathBuf>,
    default: &Path,
) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or(from_env)
        .or_else(|| default.exists().then(|| default.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config, AppConfig::default());
        assert_eq!(config.database.connection_string, DEFAULT_DATABASE);
    }

    #[test]
    fn parses_every_section() {
        let config = AppConfig::from_toml_str(
            r#"
            [database]
            connection_string = ":memory:"

            [logging]
            level = "debug"
            file = "itbi.log"

            [rates]
            SP = "3.0"
            rj = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.database.backend, "sqlite");
        assert_eq!(config.database.connection_string, ":memory:");
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
        assert_eq!(config.logging.file, Some(PathBuf::from("itbi.log")));
        assert_eq!(config.rates.get("SP"), Some(&dec!(3.0)));
        assert_eq!(config.rates.get("rj"), Some(&dec!(2)));
    }

    #[test]
    fn rate_overrides_apply_on_top_of_defaults() {
        let mut config = AppConfig::default();
        config.rates.insert("sp".to_string(), dec!(3.0));

        let table = config.rate_table().unwrap();

        assert_eq!(table.rate_for(StateCode::SP), Some(dec!(3.0)));
        assert_eq!(table.rate_for(StateCode::RJ), Some(dec!(3.0)));
        assert_eq!(table.rate_for(StateCode::AC), Some(dec!(2.0)));
    }

    #[test]
    fn unknown_state_in_rates_is_rejected() {
        let mut config = AppConfig::default();
        config.rates.insert("XX".to_string(), dec!(2));

        assert!(matches!(
            config.rate_table(),
            Err(ConfigError::UnknownState(key)) if key == "XX"
        ));
    }

    #[test]
    fn out_of_range_rate_is_rejected() {
        let mut config = AppConfig::default();
        config.rates.insert("MG".to_string(), dec!(0));

        assert!(matches!(
            config.rate_table(),
            Err(ConfigError::InvalidRate { state: StateCode::MG, .. })
        ));
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let dir = std::env::temp_dir().join(format!("itbi-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("broken.toml");
        fs::write(&path, "[database\nbackend = 1").unwrap();

        let result = AppConfig::load(&path);

        assert!(matches!(result, Err(ConfigError::Parse { .. })));
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_explicit_file_is_read_error() {
        let result = AppConfig::load(Path::new("/nonexistent/itbi.toml"));

        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn resolution_order() {
        let absent = Path::new("/nonexistent/itbi.toml");
        let explicit = Path::new("cli.toml");
        let env = PathBuf::from("env.toml");

        assert_eq!(
            resolve_config_path(Some(explicit), Some(env.clone()), absent),
            Some(PathBuf::from("cli.toml"))
        );
        assert_eq!(
            resolve_config_path(None, Some(env.clone()), absent),
            Some(env)
        );
        assert_eq!(resolve_config_path(None, None, absent), None);

        let existing = Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");
        assert_eq!(
            resolve_config_path(None, None, &existing),
            Some(existing.clone())
        );
    }

    #[test]
    fn command_line_overrides_database() {
        let mut config = AppConfig::default();

        config.override_database(None, Some(":memory:".to_string()));

        assert_eq!(
            config.db_config(),
            DbConfig {
                backend: "sqlite".to_string(),
                connection_string: ":memory:".to_string(),
            }
        );
    }
}
