use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Write,
    Delete,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::Read, Operation::Write, Operation::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Error for operation names outside {read, write, delete}.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperation(pub String);

impl fmt::Display for UnknownOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown operation '{}' (expected read, write or delete)", self.0)
    }
}

impl std::error::Error for UnknownOperation {}

impl FromStr for Operation {
    type Err = UnknownOperation;

    // Exact key match, like a lookup into the permission document.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Operation::Read),
            "write" => Ok(Operation::Write),
            "delete" => Ok(Operation::Delete),
            other => Err(UnknownOperation(other.to_string())),
        }
    }
}

/// Per-resource grant flags. Absent flags deserialize as `false`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourcePermissions {
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub write: bool,
    #[serde(default)]
    pub delete: bool,
}

impl ResourcePermissions {
    pub const NONE: ResourcePermissions = ResourcePermissions { read: false, write: false, delete: false };
    pub const FULL: ResourcePermissions = ResourcePermissions { read: true, write: true, delete: true };

    pub const fn new(read: bool, write: bool, delete: bool) -> Self { Self { read, write, delete } }

    pub fn allows(&self, op: Operation) -> bool {
        match op {
            Operation::Read => self.read,
            Operation::Write => self.write,
            Operation::Delete => self.delete,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// resource name -> flags; BTreeMap keeps rendering and persistence ordered
    #[serde(default)]
    pub permissions: BTreeMap<String, ResourcePermissions>,
}

impl Role {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self { name: name.into(), description: description.into(), permissions: BTreeMap::new() }
    }

    pub fn grant(mut self, resource: impl Into<String>, perms: ResourcePermissions) -> Self {
        self.permissions.insert(resource.into(), perms);
        self
    }

    /// Flag for `resource`/`op`; a missing resource entry is `None`.
    pub fn permission(&self, resource: &str, op: Operation) -> Option<bool> {
        self.permissions.get(resource).map(|p| p.allows(op))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub description: String,
}

impl User {
    pub fn new(name: impl Into<String>, role: impl Into<String>, description: impl Into<String>) -> Self {
        Self { name: name.into(), role: role.into(), description: description.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_parse_is_exact() {
        assert_eq!("read".parse::<Operation>().unwrap(), Operation::Read);
        assert_eq!("delete".parse::<Operation>().unwrap(), Operation::Delete);
        assert!("READ".parse::<Operation>().is_err());
        assert!("update".parse::<Operation>().is_err());
        assert!("".parse::<Operation>().is_err());
    }

    #[test]
    fn missing_flags_default_to_false() {
        let p: ResourcePermissions = serde_json::from_str(r#"{"read": true}"#).unwrap();
        assert!(p.allows(Operation::Read));
        assert!(!p.allows(Operation::Write));
        assert!(!p.allows(Operation::Delete));
    }

    #[test]
    fn role_permission_distinguishes_missing_resource() {
        let role = Role::new("sales", "Sales").grant("parts", ResourcePermissions::new(true, false, false));
        assert_eq!(role.permission("parts", Operation::Read), Some(true));
        assert_eq!(role.permission("parts", Operation::Write), Some(false));
        assert_eq!(role.permission("invoices", Operation::Read), None);
    }
}
