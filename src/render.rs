use serde_json::Value;

use crate::access::{AccessDecision, Operation, ProbeOutcome, Role, RoleTable};
use crate::storage::Document;

const MAX_COL_WIDTH: usize = 40; // cap to keep output readable

pub fn decision_line(d: &AccessDecision) -> String {
    let verdict = if d.has_access { "ALLOWED" } else { "DENIED" };
    format!("{} - {}", verdict, d.reason)
}

pub fn probe_line(o: &ProbeOutcome) -> String {
    let label = if o.probe.description.is_empty() {
        format!("{} {} {}", o.probe.username, o.probe.operation, o.probe.resource)
    } else {
        o.probe.description.clone()
    };
    format!("{}: {}", label, decision_line(&o.decision))
}

fn yes_no(b: bool) -> &'static str { if b { "yes" } else { "no" } }

/// Indented listing of one role's matrix.
pub fn role_matrix(role: &Role) -> String {
    let mut out = format!("Role: {} ({})\n  Permissions:", role.name, role.description);
    for (res, p) in &role.permissions {
        let flags: Vec<String> = Operation::ALL.iter().map(|op| format!("{}:{}", op, yes_no(p.allows(*op)))).collect();
        out.push_str(&format!("\n    {}: {}", res, flags.join(", ")));
    }
    out
}

/// One row per (role, resource) pair.
pub fn roles_table(table: &RoleTable) -> String {
    let cols: Vec<String> = ["role", "resource", "read", "write", "delete"].iter().map(|s| s.to_string()).collect();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for role in table.iter() {
        for (res, p) in &role.permissions {
            rows.push(vec![
                role.name.clone(),
                res.clone(),
                yes_no(p.read).to_string(),
                yes_no(p.write).to_string(),
                yes_no(p.delete).to_string(),
            ]);
        }
    }
    render_table(&cols, &rows)
}

/// Table over the union of document keys (sorted), `_id` left out.
pub fn documents_table(docs: &[Document]) -> String {
    let mut cols: Vec<String> = Vec::new();
    for d in docs {
        for k in d.keys() {
            if k != "_id" && !cols.contains(k) { cols.push(k.clone()); }
        }
    }
    cols.sort();
    let rows: Vec<Vec<String>> = docs
        .iter()
        .map(|d| cols.iter().map(|c| to_cell_string(d.get(c).unwrap_or(&Value::Null))).collect())
        .collect();
    render_table(&cols, &rows)
}

fn render_table(cols: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = cols.iter().map(|s| visible_len(s).min(MAX_COL_WIDTH)).collect();
    for r in rows {
        for (i, cell) in r.iter().enumerate().take(cols.len()) {
            let w = visible_len(cell);
            if w > widths[i] { widths[i] = w.min(MAX_COL_WIDTH); }
        }
    }
    let sep = build_separator(&widths);
    let mut lines = vec![sep.clone(), build_row(cols, &widths), sep.clone()];
    for r in rows {
        lines.push(build_row(r, &widths));
    }
    lines.push(sep);
    lines.push(format!("rows: {}, cols: {}", rows.len(), cols.len()));
    lines.join("\n")
}

fn to_cell_string(v: &Value) -> String {
    match v {
        Value::Null => String::from("NULL"),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        // keep objects/arrays compact
        other => other.to_string(),
    }
}

fn visible_len(s: &str) -> usize { s.chars().count() }

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('+');
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).map(|c| truncate(c, *w)).unwrap_or_default();
        let pad = w.saturating_sub(visible_len(&cell));
        s.push(' ');
        s.push_str(&cell);
        s.push_str(&" ".repeat(pad));
        s.push_str(" |");
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    if visible_len(s) <= max { return s.to_string(); }
    let keep = max.saturating_sub(1);
    let mut out: String = s.chars().take(keep).collect();
    out.push('…');
    out
}
