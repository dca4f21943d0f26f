//! JSON fixture loading: the role matrix, the user directory and opaque seed
//! documents for the shop collections.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

use crate::access::{ResourcePermissions, Role, RoleTable, User, UserDirectory};
use crate::storage::Document;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("cannot read fixture '{path}': {source}")]
    Read { path: PathBuf, #[source] source: std::io::Error },
    #[error("invalid JSON in {origin}: {source}")]
    Parse { origin: String, #[source] source: serde_json::Error },
    #[error("duplicate {kind} '{name}'")]
    Duplicate { kind: &'static str, name: String },
    #[error("{kind} with an empty name")]
    EmptyName { kind: &'static str },
    #[error("{origin} must hold a JSON array of objects")]
    NotAnArray { origin: String },
    #[error("malformed {kind} document: {message}")]
    Malformed { kind: &'static str, message: String },
}

pub const ROLES_FILE: &str = "roles.json";
pub const USERS_FILE: &str = "users.json";

/// Body of one entry in `roles.json`, keyed by role name.
#[derive(Debug, Deserialize)]
struct RoleBody {
    #[serde(default)]
    description: String,
    #[serde(default)]
    permissions: BTreeMap<String, ResourcePermissions>,
}

fn read(path: &Path) -> Result<Vec<u8>, FixtureError> {
    std::fs::read(path).map_err(|source| FixtureError::Read { path: path.to_path_buf(), source })
}

/// Parse `{ "<role>": { "description": .., "permissions": {..} } }`.
pub fn parse_roles(text: &str, origin: &str) -> Result<RoleTable, FixtureError> {
    roles_from_slice(text.as_bytes(), origin)
}

fn roles_from_slice(bytes: &[u8], origin: &str) -> Result<RoleTable, FixtureError> {
    let raw: BTreeMap<String, RoleBody> = serde_json::from_slice(bytes)
        .map_err(|source| FixtureError::Parse { origin: origin.to_string(), source })?;
    RoleTable::new(raw.into_iter().map(|(name, body)| Role {
        name,
        description: body.description,
        permissions: body.permissions,
    }))
}

/// Parse an array of `{ "name", "role", "description" }`.
pub fn parse_users(text: &str, origin: &str) -> Result<UserDirectory, FixtureError> {
    users_from_slice(text.as_bytes(), origin)
}

fn users_from_slice(bytes: &[u8], origin: &str) -> Result<UserDirectory, FixtureError> {
    let users: Vec<User> = serde_json::from_slice(bytes)
        .map_err(|source| FixtureError::Parse { origin: origin.to_string(), source })?;
    UserDirectory::new(users)
}

pub fn load_roles(path: &Path) -> Result<RoleTable, FixtureError> {
    roles_from_slice(&read(path)?, &path.display().to_string())
}

pub fn load_users(path: &Path) -> Result<UserDirectory, FixtureError> {
    users_from_slice(&read(path)?, &path.display().to_string())
}

/// Load a collection seed file: a JSON array whose elements are all objects.
pub fn load_documents(path: &Path) -> Result<Vec<Document>, FixtureError> {
    let bytes = read(path)?;
    let origin = path.display().to_string();
    let value: serde_json::Value = serde_json::from_slice(&bytes)
        .map_err(|source| FixtureError::Parse { origin: origin.clone(), source })?;
    let serde_json::Value::Array(items) = value else {
        return Err(FixtureError::NotAnArray { origin });
    };
    let mut docs = Vec::with_capacity(items.len());
    for item in items {
        match item {
            serde_json::Value::Object(m) => docs.push(m),
            _ => return Err(FixtureError::NotAnArray { origin }),
        }
    }
    Ok(docs)
}

/// Find `<collection>.json` seed files directly under `dir` for the wanted
/// collections. Returns (collection, path) pairs sorted by collection name.
pub fn discover_seed_files(dir: &Path, wanted: &[&str]) -> Vec<(String, PathBuf)> {
    let mut out: Vec<(String, PathBuf)> = Vec::new();
    for ent in WalkDir::new(dir).min_depth(1).max_depth(1).into_iter().flatten() {
        if !ent.file_type().is_file() { continue; }
        let path = ent.path();
        if path.extension().and_then(|s| s.to_str()) != Some("json") { continue; }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else { continue; };
        if wanted.contains(&stem) {
            debug!(target: "partshop::fixtures", "seed file for '{}': {}", stem, path.display());
            out.push((stem.to_string(), path.to_path_buf()));
        }
    }
    out.sort();
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::Operation;

    const ROLES: &str = r#"{
        "admin": {"description": "Full", "permissions": {"parts": {"read": true, "write": true, "delete": true}}},
        "clerk": {"permissions": {"parts": {"read": true}}}
    }"#;

    #[test]
    fn roles_fixture_keys_become_names() {
        let table = parse_roles(ROLES, "inline").unwrap();
        assert_eq!(table.len(), 2);
        let clerk = table.get("clerk").unwrap();
        assert_eq!(clerk.description, "");
        assert_eq!(clerk.permission("parts", Operation::Write), Some(false));
        assert_eq!(table.get("admin").unwrap().permission("parts", Operation::Delete), Some(true));
    }

    #[test]
    fn duplicate_users_are_rejected() {
        let text = r#"[{"name": "a", "role": "admin"}, {"name": "a", "role": "clerk"}]"#;
        assert!(matches!(parse_users(text, "inline"), Err(FixtureError::Duplicate { kind: "user", .. })));
    }

    #[test]
    fn bad_json_names_its_origin() {
        let err = parse_roles("{not json", "roles.json").unwrap_err();
        assert!(err.to_string().contains("roles.json"));
    }

    #[test]
    fn invalid_utf8_fixtures_are_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let roles = tmp.path().join(ROLES_FILE);
        let mut bytes = br#"{"adm"#.to_vec();
        bytes.push(0xFF);
        bytes.extend_from_slice(br#"in": {"permissions": {}}}"#);
        std::fs::write(&roles, &bytes).unwrap();
        assert!(matches!(load_roles(&roles), Err(FixtureError::Parse { .. })));

        let users = tmp.path().join(USERS_FILE);
        let mut bytes = br#"[{"name": "admin_us"#.to_vec();
        bytes.push(0xC3);
        bytes.extend_from_slice(br#"", "role": "admin"}]"#);
        std::fs::write(&users, &bytes).unwrap();
        assert!(matches!(load_users(&users), Err(FixtureError::Parse { .. })));
    }

    #[test]
    fn seed_files_must_be_arrays_of_objects() {
        let tmp = tempfile::tempdir().unwrap();
        let good = tmp.path().join("parts.json");
        std::fs::write(&good, r#"[{"partNumber": "FIL-001"}, {"partNumber": "BRK-002"}]"#).unwrap();
        let bad = tmp.path().join("orders.json");
        std::fs::write(&bad, r#"{"orderId": "ORD-001"}"#).unwrap();
        let mixed = tmp.path().join("customers.json");
        std::fs::write(&mixed, r#"[{"customerId": "C001"}, 7]"#).unwrap();
        std::fs::write(tmp.path().join("notes.json"), "[]").unwrap();

        assert_eq!(load_documents(&good).unwrap().len(), 2);
        assert!(matches!(load_documents(&bad), Err(FixtureError::NotAnArray { .. })));
        assert!(matches!(load_documents(&mixed), Err(FixtureError::NotAnArray { .. })));
        assert!(matches!(load_documents(&tmp.path().join("absent.json")), Err(FixtureError::Read { .. })));

        let found = discover_seed_files(tmp.path(), &["parts", "customers", "orders"]);
        let names: Vec<&str> = found.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(names, vec!["customers", "orders", "parts"]);
    }
}
