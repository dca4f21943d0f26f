//! Role-based access walkthrough: store the roles, read them back, run the
//! standard probes against them, then show per-creator order visibility.

use serde_json::json;
use tracing::{debug, info};

use crate::access::{defaults, persist, run_probes, AccessChecker, ProbeOutcome, RoleTable, UserDirectory};
use crate::error::AppResult;
use crate::render;
use crate::storage::{DocStore, Document, Filter};

pub const SALES_ORDERS_COLLECTION: &str = "salesOrdersWithAccess";

#[derive(Debug, Clone, Default)]
pub struct AccessReport {
    pub outcomes: Vec<ProbeOutcome>,
    /// (role, resource) pairs with no permission entry
    pub gaps: Vec<(String, String)>,
    /// (viewer, visible order ids)
    pub row_level: Vec<(String, Vec<String>)>,
}

impl AccessReport {
    pub fn granted(&self) -> usize { self.outcomes.iter().filter(|o| o.decision.has_access).count() }
}

fn object(v: serde_json::Value) -> Document {
    match v {
        serde_json::Value::Object(m) => m,
        _ => Document::new(),
    }
}

pub fn sample_sales_orders() -> Vec<Document> {
    vec![
        object(json!({"orderId": "SO-001", "customerId": "C001", "amount": 150.5, "status": "Completed", "createdBy": "sales_user1"})),
        object(json!({"orderId": "SO-002", "customerId": "C002", "amount": 285.75, "status": "Completed", "createdBy": "sales_user2"})),
        object(json!({"orderId": "SO-003", "customerId": "C003", "amount": 99.9, "status": "Pending", "createdBy": "sales_user1"})),
    ]
}

/// Orders a viewer may see: their own when `created_by` is set, all otherwise.
pub fn visible_orders(store: &DocStore, created_by: Option<&str>) -> Vec<Document> {
    let filter = match created_by {
        Some(who) => Filter::eq("createdBy", who),
        None => Filter::all(),
    };
    store.find(SALES_ORDERS_COLLECTION, &filter)
}

fn order_ids(docs: &[Document]) -> Vec<String> {
    docs.iter()
        .filter_map(|d| d.get("orderId").and_then(|v| v.as_str()).map(str::to_string))
        .collect()
}

pub fn run(store: &DocStore, roles: &RoleTable, users: &UserDirectory) -> AppResult<AccessReport> {
    println!("----- Users -----");
    for u in users.iter() {
        println!("{} -> {} ({})", u.name, u.role, u.description);
    }

    println!("\n----- Roles -----");
    let saved = persist::save_roles(store, roles)?;
    println!("{} roles written to '{}'", saved, persist::ROLES_COLLECTION);
    // Decisions below are made from what the store returned, not the input table.
    let stored = persist::load_roles(store)?;
    for role in stored.iter() {
        println!("{}", render::role_matrix(role));
    }

    println!("\n----- Access checks -----");
    let checker = AccessChecker::new(stored, users.clone());
    let outcomes = run_probes(&checker, &defaults::standard_probes());
    for o in &outcomes {
        println!("{}", render::probe_line(o));
    }

    let mut resources = checker.roles().resources();
    for c in defaults::SHOP_COLLECTIONS {
        if !resources.iter().any(|r| r == c) { resources.push(c.to_string()); }
    }
    let gaps = checker.roles().coverage_gaps(&resources);
    if gaps.is_empty() {
        println!("Every role has an entry for: {}", resources.join(", "));
    } else {
        for (role, res) in &gaps {
            println!("Role '{}' has no entry for '{}' (denied)", role, res);
        }
    }

    println!("\n----- Row-level filtering -----");
    if !store.has_collection(SALES_ORDERS_COLLECTION) {
        store.create_collection(SALES_ORDERS_COLLECTION)?;
    }
    let cleared = store.delete_many(SALES_ORDERS_COLLECTION, &Filter::all());
    debug!(target: "partshop::demos", "cleared {} sample orders", cleared);
    let n = store.insert_many(SALES_ORDERS_COLLECTION, sample_sales_orders())?;
    println!("{} sample orders with creator added", n);

    let mut row_level = Vec::new();
    for (viewer, created_by) in [("sales_user1", Some("sales_user1")), ("sales_user2", Some("sales_user2")), ("admin", None)] {
        let ids = order_ids(&visible_orders(store, created_by));
        println!("{} sees {} orders: {}", viewer, ids.len(), ids.join(", "));
        row_level.push((viewer.to_string(), ids));
    }

    let report = AccessReport { outcomes, gaps, row_level };
    info!(
        target: "partshop::demos",
        "access demo: {} probes, {} granted, {} coverage gaps",
        report.outcomes.len(), report.granted(), report.gaps.len()
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::DecisionReason;

    #[test]
    fn standard_run_over_builtins() {
        let store = DocStore::in_memory(std::env::temp_dir().join("partshop-unused"), "t");
        let report = run(&store, &defaults::default_role_table(), &defaults::default_user_directory()).unwrap();

        let verdicts: Vec<bool> = report.outcomes.iter().map(|o| o.decision.has_access).collect();
        assert_eq!(verdicts, vec![true, true, false, true, false, true, false, true, false]);
        assert!(report.outcomes.iter().all(|o| o.decision.reason != DecisionReason::UnknownUser));
        assert!(report.gaps.is_empty());

        assert_eq!(report.row_level[0], ("sales_user1".to_string(), vec!["SO-001".to_string(), "SO-003".to_string()]));
        assert_eq!(report.row_level[1].1, vec!["SO-002".to_string()]);
        assert_eq!(report.row_level[2].1.len(), 3);
    }

    #[test]
    fn rerun_does_not_duplicate_rows() {
        let store = DocStore::in_memory(std::env::temp_dir().join("partshop-unused"), "t");
        let roles = defaults::default_role_table();
        let users = defaults::default_user_directory();
        run(&store, &roles, &users).unwrap();
        run(&store, &roles, &users).unwrap();
        assert_eq!(store.count(SALES_ORDERS_COLLECTION, &Filter::all()), 3);
        assert_eq!(store.count(persist::ROLES_COLLECTION, &Filter::all()), 5);
    }
}
