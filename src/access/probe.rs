use serde::{Deserialize, Serialize};

use super::checker::{AccessChecker, AccessDecision};

/// A named (user, resource, operation) question. The operation stays a raw
/// string so probes from fixtures or the shell can carry anything.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessProbe {
    pub username: String,
    pub resource: String,
    pub operation: String,
    #[serde(default)]
    pub description: String,
}

impl AccessProbe {
    pub fn new(username: &str, resource: &str, operation: &str, description: &str) -> Self {
        Self {
            username: username.to_string(),
            resource: resource.to_string(),
            operation: operation.to_string(),
            description: description.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub probe: AccessProbe,
    pub decision: AccessDecision,
}

pub fn run_probes(checker: &AccessChecker, probes: &[AccessProbe]) -> Vec<ProbeOutcome> {
    probes
        .iter()
        .map(|p| ProbeOutcome {
            probe: p.clone(),
            decision: checker.check_access_raw(&p.username, &p.resource, &p.operation),
        })
        .collect()
}
