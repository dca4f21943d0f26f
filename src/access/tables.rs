//! Immutable role and user tables.
//!
//! Both tables are validated once at construction (non-empty, unique names)
//! and expose read-only lookups afterwards, so a single instance can be shared
//! across threads without locking.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use super::model::{Role, User};
use crate::fixtures::FixtureError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleTable {
    roles: BTreeMap<String, Role>,
}

impl RoleTable {
    pub fn new<I: IntoIterator<Item = Role>>(roles: I) -> Result<Self, FixtureError> {
        let mut map = BTreeMap::new();
        for role in roles {
            if role.name.trim().is_empty() {
                return Err(FixtureError::EmptyName { kind: "role" });
            }
            if map.contains_key(&role.name) {
                return Err(FixtureError::Duplicate { kind: "role", name: role.name });
            }
            map.insert(role.name.clone(), role);
        }
        Ok(Self { roles: map })
    }

    pub fn get(&self, name: &str) -> Option<&Role> { self.roles.get(name) }
    pub fn contains(&self, name: &str) -> bool { self.roles.contains_key(name) }
    pub fn len(&self) -> usize { self.roles.len() }
    pub fn is_empty(&self) -> bool { self.roles.is_empty() }

    /// Roles ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &Role> { self.roles.values() }

    /// Union of every resource named by any role, sorted.
    pub fn resources(&self) -> Vec<String> {
        let set: BTreeSet<&String> = self.roles.values().flat_map(|r| r.permissions.keys()).collect();
        set.into_iter().cloned().collect()
    }

    /// (role, resource) pairs with no permission entry. Checks against these
    /// pairs are denied; this only reports them.
    pub fn coverage_gaps(&self, resources: &[String]) -> Vec<(String, String)> {
        let mut out = Vec::new();
        for role in self.roles.values() {
            for res in resources {
                if !role.permissions.contains_key(res) {
                    out.push((role.name.clone(), res.clone()));
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserDirectory {
    users: BTreeMap<String, User>,
}

impl UserDirectory {
    pub fn new<I: IntoIterator<Item = User>>(users: I) -> Result<Self, FixtureError> {
        let mut map = BTreeMap::new();
        for user in users {
            if user.name.trim().is_empty() {
                return Err(FixtureError::EmptyName { kind: "user" });
            }
            if map.contains_key(&user.name) {
                return Err(FixtureError::Duplicate { kind: "user", name: user.name });
            }
            map.insert(user.name.clone(), user);
        }
        Ok(Self { users: map })
    }

    pub fn get(&self, name: &str) -> Option<&User> { self.users.get(name) }
    pub fn len(&self) -> usize { self.users.len() }
    pub fn is_empty(&self) -> bool { self.users.is_empty() }
    pub fn iter(&self) -> impl Iterator<Item = &User> { self.users.values() }

    /// Log users whose role is missing from `roles`. Such users stay in the
    /// directory; every check for them resolves to an unknown-role decision.
    pub fn warn_dangling_roles(&self, roles: &RoleTable) -> usize {
        let mut n = 0;
        for u in self.users.values() {
            if !roles.contains(&u.role) {
                warn!(target: "partshop::access", "user '{}' references unknown role '{}'", u.name, u.role);
                n += 1;
            }
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::model::ResourcePermissions;

    #[test]
    fn duplicate_role_is_rejected() {
        let err = RoleTable::new(vec![Role::new("admin", "a"), Role::new("admin", "b")]).unwrap_err();
        assert!(matches!(err, FixtureError::Duplicate { kind: "role", ref name } if name == "admin"));
    }

    #[test]
    fn empty_user_name_is_rejected() {
        let err = UserDirectory::new(vec![User::new("  ", "admin", "")]).unwrap_err();
        assert!(matches!(err, FixtureError::EmptyName { kind: "user" }));
    }

    #[test]
    fn dangling_role_is_accepted_and_counted() {
        let roles = RoleTable::new(vec![Role::new("admin", "")]).unwrap();
        let users = UserDirectory::new(vec![
            User::new("admin_user", "admin", ""),
            User::new("orphan", "auditor", ""),
        ]).unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users.warn_dangling_roles(&roles), 1);
    }

    #[test]
    fn coverage_gaps_lists_missing_pairs() {
        let roles = RoleTable::new(vec![
            Role::new("a", "").grant("parts", ResourcePermissions::FULL).grant("orders", ResourcePermissions::FULL),
            Role::new("b", "").grant("parts", ResourcePermissions::NONE),
        ]).unwrap();
        let resources = roles.resources();
        assert_eq!(resources, vec!["orders".to_string(), "parts".to_string()]);
        assert_eq!(roles.coverage_gaps(&resources), vec![("b".to_string(), "orders".to_string())]);
    }
}
