//! Role table <-> `roles` collection.

use tracing::info;

use super::model::Role;
use super::tables::RoleTable;
use crate::error::AppResult;
use crate::fixtures::FixtureError;
use crate::storage::{DocStore, Document, Filter};

pub const ROLES_COLLECTION: &str = "roles";

fn role_to_document(role: &Role) -> AppResult<Document> {
    match serde_json::to_value(role)? {
        serde_json::Value::Object(m) => Ok(m),
        _ => Err(crate::error::AppError::internal("role_encode", "role did not encode as an object")),
    }
}

/// Replace the contents of the `roles` collection with `table`. Returns the
/// number of role documents written.
pub fn save_roles(store: &DocStore, table: &RoleTable) -> AppResult<usize> {
    if !store.has_collection(ROLES_COLLECTION) {
        store.create_collection(ROLES_COLLECTION)?;
    }
    let removed = store.delete_many(ROLES_COLLECTION, &Filter::all());
    let docs = table.iter().map(role_to_document).collect::<AppResult<Vec<_>>>()?;
    let n = store.insert_many(ROLES_COLLECTION, docs)?;
    info!(target: "partshop::access", "saved {} roles (replaced {})", n, removed);
    Ok(n)
}

/// Rebuild a role table from the `roles` collection. Store bookkeeping
/// fields such as `_id` are ignored.
pub fn load_roles(store: &DocStore) -> AppResult<RoleTable> {
    let mut roles = Vec::new();
    for mut doc in store.find(ROLES_COLLECTION, &Filter::all()) {
        doc.remove("_id");
        let role: Role = serde_json::from_value(serde_json::Value::Object(doc))
            .map_err(|e| FixtureError::Malformed { kind: "role", message: e.to_string() })?;
        roles.push(role);
    }
    Ok(RoleTable::new(roles)?)
}

/// Single role lookup by name.
pub fn find_role(store: &DocStore, name: &str) -> AppResult<Option<Role>> {
    let Some(mut doc) = store.find_one(ROLES_COLLECTION, &Filter::eq("name", name)) else {
        return Ok(None);
    };
    doc.remove("_id");
    let role = serde_json::from_value(serde_json::Value::Object(doc))
        .map_err(|e| FixtureError::Malformed { kind: "role", message: e.to_string() })?;
    Ok(Some(role))
}
