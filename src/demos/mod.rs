//! Demonstration runs exposed by the `partshop` binary.
//!
//! Each demo takes an already opened `DocStore` and returns a small report so
//! callers (and tests) can inspect what happened; progress is printed to
//! stdout as it goes. `finish` performs the closing flush whatever the outcome.

pub mod access;
pub mod crud;
pub mod setup;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::access::{defaults, RoleTable, UserDirectory};
use crate::config::Settings;
use crate::error::AppResult;
use crate::fixtures;
use crate::storage::DocStore;

/// Roles and users from the fixture directory, falling back to the built-in
/// catalog for whichever file is absent. A file that exists but fails to
/// parse is an error.
pub fn load_tables(settings: &Settings) -> AppResult<(RoleTable, UserDirectory)> {
    let roles_path = settings.roles_fixture();
    let roles = if roles_path.is_file() {
        fixtures::load_roles(&roles_path)?
    } else {
        info!(target: "partshop::demos", "no '{}', using built-in roles", roles_path.display());
        defaults::default_role_table()
    };
    let users_path = settings.users_fixture();
    let users = if users_path.is_file() {
        fixtures::load_users(&users_path)?
    } else {
        info!(target: "partshop::demos", "no '{}', using built-in users", users_path.display());
        defaults::default_user_directory()
    };
    users.warn_dangling_roles(&roles);
    Ok((roles, users))
}

/// Open the configured database. The handle of the background flush task, if
/// persistence is enabled, goes back to the caller for `finish`.
pub async fn open_store(settings: &Settings) -> AppResult<(DocStore, Option<JoinHandle<()>>)> {
    let store = DocStore::open(&settings.db_root, &settings.db_name).await?;
    let persist = store.start_persistence(&settings.persistence);
    Ok((store, persist))
}

/// Stop background persistence, flush `store` and hand back `outcome`. The
/// flush runs even when the demo failed; in that case a flush error is only
/// logged.
pub async fn finish<T>(store: &DocStore, persist: Option<JoinHandle<()>>, outcome: AppResult<T>) -> AppResult<T> {
    if let Some(task) = persist {
        task.abort();
        let _ = task.await;
    }
    let flushed = store.flush().await;
    match (outcome, flushed) {
        (Ok(v), Ok(())) => {
            info!(target: "partshop::demos", "database '{}' flushed to '{}'", store.name(), store.dir().display());
            Ok(v)
        }
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => {
            warn!(target: "partshop::demos", "demo failed, store flushed: {}", e);
            Err(e)
        }
        (Err(e), Err(fe)) => {
            error!(target: "partshop::demos", "flush after failed demo also failed: {}", fe);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::storage::{Filter, PersistenceSettings};

    #[tokio::test]
    async fn finish_flushes_even_on_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let store = DocStore::open(tmp.path(), "shop").await.unwrap();
        store.insert_one("parts", serde_json::Map::new()).unwrap();
        let out: AppResult<()> = finish(&store, None, Err(AppError::internal("boom", "demo failed"))).await;
        assert_eq!(out.unwrap_err().code_str(), "boom");

        let reopened = DocStore::open(tmp.path(), "shop").await.unwrap();
        assert_eq!(reopened.count("parts", &Filter::all()), 1);
    }

    #[tokio::test]
    async fn finish_stops_background_persistence_before_flushing() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings {
            db_root: tmp.path().to_path_buf(),
            db_name: "shop".to_string(),
            persistence: PersistenceSettings::every(5),
            ..Settings::default()
        };
        let (store, persist) = open_store(&settings).await.unwrap();
        assert!(persist.is_some());
        store.insert_one("orders", serde_json::Map::new()).unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(30)).await;

        finish(&store, persist, Ok(())).await.unwrap();
        let reopened = DocStore::open(tmp.path(), "shop").await.unwrap();
        assert_eq!(reopened.count("orders", &Filter::all()), 1);
    }

    #[test]
    fn missing_fixture_files_fall_back_to_builtins() {
        let tmp = tempfile::tempdir().unwrap();
        let settings = Settings { fixtures_dir: tmp.path().to_path_buf(), ..Settings::default() };
        let (roles, users) = load_tables(&settings).unwrap();
        assert_eq!(roles, defaults::default_role_table());
        assert_eq!(users, defaults::default_user_directory());
    }

    #[test]
    fn broken_roles_fixture_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("roles.json"), "[1, 2]").unwrap();
        let settings = Settings { fixtures_dir: tmp.path().to_path_buf(), ..Settings::default() };
        let err = load_tables(&settings).unwrap_err();
        assert_eq!(err.code_str(), "fixture_invalid");
    }
}
