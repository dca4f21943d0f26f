//! Access checker: (user, resource, operation) -> decision over the role and
//! user tables. Every inconclusive lookup is a denial with a reason code.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use super::model::Operation;
use super::tables::{RoleTable, UserDirectory};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DecisionReason {
    UnknownUser,
    UnknownRole,
    Granted,
    Denied,
}

impl DecisionReason {
    pub fn code(self) -> &'static str {
        match self {
            DecisionReason::UnknownUser => "UNKNOWN_USER",
            DecisionReason::UnknownRole => "UNKNOWN_ROLE",
            DecisionReason::Granted => "GRANTED",
            DecisionReason::Denied => "DENIED",
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            DecisionReason::UnknownUser => "unknown user",
            DecisionReason::UnknownRole => "unknown role",
            DecisionReason::Granted => "access granted",
            DecisionReason::Denied => "access denied",
        }
    }
}

impl fmt::Display for DecisionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.describe()) }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct AccessDecision {
    pub has_access: bool,
    pub reason: DecisionReason,
}

impl AccessDecision {
    fn deny(reason: DecisionReason) -> Self { Self { has_access: false, reason } }

    fn from_flag(allowed: bool) -> Self {
        if allowed {
            Self { has_access: true, reason: DecisionReason::Granted }
        } else {
            Self::deny(DecisionReason::Denied)
        }
    }
}

/// Read-only checker over shared tables. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AccessChecker {
    roles: Arc<RoleTable>,
    users: Arc<UserDirectory>,
}

impl AccessChecker {
    pub fn new(roles: RoleTable, users: UserDirectory) -> Self {
        Self { roles: Arc::new(roles), users: Arc::new(users) }
    }

    pub fn roles(&self) -> &RoleTable { &self.roles }
    pub fn users(&self) -> &UserDirectory { &self.users }

    pub fn check_access(&self, username: &str, resource: &str, operation: Operation) -> AccessDecision {
        self.resolve(username, resource, Some(operation), operation.as_str())
    }

    /// Same lookup order as `check_access`, with the operation as an untyped
    /// key. Names outside {read, write, delete} behave like a missing key.
    pub fn check_access_raw(&self, username: &str, resource: &str, operation: &str) -> AccessDecision {
        self.resolve(username, resource, operation.parse().ok(), operation)
    }

    fn resolve(&self, username: &str, resource: &str, op: Option<Operation>, op_label: &str) -> AccessDecision {
        let Some(user) = self.users.get(username) else {
            debug!(target: "partshop::access", "deny user='{}' resource='{}' op='{}': unknown user", username, resource, op_label);
            return AccessDecision::deny(DecisionReason::UnknownUser);
        };
        let Some(role) = self.roles.get(&user.role) else {
            debug!(target: "partshop::access", "deny user='{}' role='{}': unknown role", username, user.role);
            return AccessDecision::deny(DecisionReason::UnknownRole);
        };
        let flag = match op {
            Some(op) => role.permission(resource, op),
            None => None,
        };
        if flag.is_none() {
            debug!(
                target: "partshop::access",
                "no permission entry role='{}' resource='{}' op='{}'; denying",
                role.name, resource, op_label
            );
        }
        let decision = AccessDecision::from_flag(flag == Some(true));
        trace!(target: "partshop::access", "user='{}' role='{}' resource='{}' op='{}' -> {}", username, role.name, resource, op_label, decision.reason.code());
        decision
    }
}

#[cfg(test)]
#[path = "checker_tests.rs"]
mod checker_tests;
