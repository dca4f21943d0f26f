//! Role-based access control for the shop collections.
//! Keep the public surface thin and split implementation across sub-modules.

mod model;
mod tables;
mod checker;
mod probe;
pub mod defaults;
pub mod persist;

pub use model::{Operation, ResourcePermissions, Role, UnknownOperation, User};
pub use tables::{RoleTable, UserDirectory};
pub use checker::{AccessChecker, AccessDecision, DecisionReason};
pub use probe::{run_probes, AccessProbe, ProbeOutcome};
