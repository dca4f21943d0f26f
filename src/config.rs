//! Runtime configuration: CLI flags, then environment (optionally from `.env`),
//! then defaults.

use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use crate::fixtures::{ROLES_FILE, USERS_FILE};
use crate::storage::PersistenceSettings;

pub const ENV_DB_FOLDER: &str = "PARTSHOP_DB_FOLDER";
pub const ENV_DB_NAME: &str = "PARTSHOP_DB_NAME";
pub const ENV_FIXTURES: &str = "PARTSHOP_FIXTURES";
pub const ENV_PERSIST_INTERVAL_MS: &str = "PARTSHOP_PERSIST_INTERVAL_MS";

#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    /// Root folder holding one directory per database
    #[arg(long = "root", global = true, env = ENV_DB_FOLDER, default_value = "dbs")]
    pub db_root: PathBuf,
    /// Database name under the root folder
    #[arg(long = "db", global = true, env = ENV_DB_NAME, default_value = "autoparts")]
    pub db_name: String,
    /// Directory with roles.json, users.json and collection seed files
    #[arg(long = "fixtures", global = true, env = ENV_FIXTURES, default_value = "data")]
    pub fixtures_dir: PathBuf,
    /// Flush the store in the background every N milliseconds (0 disables)
    #[arg(long = "persist-interval-ms", global = true, env = ENV_PERSIST_INTERVAL_MS, default_value_t = 0)]
    pub persist_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db_root: PathBuf,
    pub db_name: String,
    pub fixtures_dir: PathBuf,
    pub persistence: PersistenceSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_root: PathBuf::from("dbs"),
            db_name: "autoparts".to_string(),
            fixtures_dir: PathBuf::from("data"),
            persistence: PersistenceSettings::default(),
        }
    }
}

impl From<StoreArgs> for Settings {
    fn from(a: StoreArgs) -> Self {
        Self {
            db_root: a.db_root,
            db_name: a.db_name,
            fixtures_dir: a.fixtures_dir,
            persistence: PersistenceSettings::every(a.persist_interval_ms),
        }
    }
}

impl Settings {
    pub fn roles_fixture(&self) -> PathBuf { self.fixtures_dir.join(ROLES_FILE) }
    pub fn users_fixture(&self) -> PathBuf { self.fixtures_dir.join(USERS_FILE) }
}

/// Load `.env` from the working directory if present. Must run before clap
/// parses so `env = ..` fallbacks see the values.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!(target: "partshop::config", "loaded environment from '{}'", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => eprintln!("warning: ignoring unreadable .env: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(persist_interval_ms: u64) -> StoreArgs {
        StoreArgs { db_root: "x".into(), db_name: "shop".into(), fixtures_dir: "fx".into(), persist_interval_ms }
    }

    #[test]
    fn zero_interval_disables_persistence() {
        let s = Settings::from(args(0));
        assert!(!s.persistence.enabled);
        assert_eq!(s.roles_fixture(), PathBuf::from("fx").join("roles.json"));

        let s = Settings::from(args(250));
        assert!(s.persistence.enabled);
        assert_eq!(s.persistence.interval_ms, 250);
    }
}
