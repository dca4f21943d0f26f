//! Access checker integration tests over the shipped fixtures and the
//! built-in catalog: the documented scenarios plus fail-closed properties.

use anyhow::Result;
use std::path::Path;

use partshop::access::{defaults, AccessChecker, DecisionReason, Operation, Role, RoleTable, User, UserDirectory};
use partshop::fixtures;

fn shipped_checker() -> Result<AccessChecker> {
    let data = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    let roles = fixtures::load_roles(&data.join(fixtures::ROLES_FILE))?;
    let users = fixtures::load_users(&data.join(fixtures::USERS_FILE))?;
    Ok(AccessChecker::new(roles, users))
}

fn assert_decision(c: &AccessChecker, user: &str, res: &str, op: Operation, has: bool, reason: DecisionReason) {
    let d = c.check_access(user, res, op);
    assert_eq!((d.has_access, d.reason), (has, reason), "{} {} {}", user, op, res);
}

#[test]
fn shipped_fixtures_match_builtin_catalog() -> Result<()> {
    let c = shipped_checker()?;
    assert_eq!(c.roles(), &defaults::default_role_table());
    assert_eq!(c.users(), &defaults::default_user_directory());
    Ok(())
}

#[test]
fn documented_scenarios() -> Result<()> {
    let c = shipped_checker()?;
    assert_decision(&c, "admin_user", "parts", Operation::Delete, true, DecisionReason::Granted);
    assert_decision(&c, "sales_user", "parts", Operation::Write, false, DecisionReason::Denied);
    assert_decision(&c, "reports_user", "orders", Operation::Write, false, DecisionReason::Denied);
    assert_decision(&c, "reports_user", "orders", Operation::Read, true, DecisionReason::Granted);
    assert_decision(&c, "ghost_user", "parts", Operation::Read, false, DecisionReason::UnknownUser);
    Ok(())
}

#[test]
fn every_builtin_cell_follows_the_matrix() {
    let c = AccessChecker::new(defaults::default_role_table(), defaults::default_user_directory());
    for user in defaults::default_users() {
        let role = defaults::default_role_table().get(&user.role).cloned().unwrap();
        for res in defaults::SHOP_COLLECTIONS {
            for op in Operation::ALL {
                let expected = role.permission(res, op).unwrap();
                let d = c.check_access(&user.name, res, op);
                assert_eq!(d.has_access, expected);
                let want = if expected { DecisionReason::Granted } else { DecisionReason::Denied };
                assert_eq!(d.reason, want);
            }
        }
    }
}

#[test]
fn unknown_role_and_uncovered_resource_fail_closed() -> Result<()> {
    let roles = RoleTable::new(vec![Role::new("clerk", "")])?;
    let users = UserDirectory::new(vec![User::new("orphan", "auditor", ""), User::new("clerk_user", "clerk", "")])?;
    let c = AccessChecker::new(roles, users);
    for op in Operation::ALL {
        assert_decision(&c, "orphan", "parts", op, false, DecisionReason::UnknownRole);
        assert_decision(&c, "clerk_user", "parts", op, false, DecisionReason::Denied);
    }
    Ok(())
}

#[test]
fn raw_operations_keep_lookup_order() -> Result<()> {
    let c = shipped_checker()?;
    assert_eq!(c.check_access_raw("admin_user", "parts", "purge").reason, DecisionReason::Denied);
    assert_eq!(c.check_access_raw("admin_user", "parts", "DELETE").reason, DecisionReason::Denied);
    assert_eq!(c.check_access_raw("ghost_user", "parts", "purge").reason, DecisionReason::UnknownUser);
    assert!(c.check_access_raw("admin_user", "parts", "delete").has_access);
    Ok(())
}

#[test]
fn decisions_are_deterministic() -> Result<()> {
    let c = shipped_checker()?;
    let first = c.check_access("manager_user", "orders", Operation::Write);
    for _ in 0..100 {
        assert_eq!(c.check_access("manager_user", "orders", Operation::Write), first);
    }
    Ok(())
}

#[test]
fn json_decision_shape() -> Result<()> {
    let c = shipped_checker()?;
    let text = serde_json::to_string(&c.check_access("ghost_user", "parts", Operation::Read))?;
    assert_eq!(text, r#"{"hasAccess":false,"reason":"UNKNOWN_USER"}"#);
    Ok(())
}
