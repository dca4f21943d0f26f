use serde_json::Value as JsonValue;

use super::Document;

/// Conjunction of equality conditions on dotted field paths.
///
/// An array field matches a scalar condition when any element equals it, so
/// `Filter::eq("compatibleCars", "BMW")` finds parts listing BMW.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conds: Vec<(String, JsonValue)>,
}

impl Filter {
    pub fn all() -> Self { Self::default() }

    pub fn eq(field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        Self { conds: vec![(field.into(), value.into())] }
    }

    pub fn and(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.conds.push((field.into(), value.into()));
        self
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.conds.iter().all(|(path, want)| match lookup(doc, path) {
            Some(JsonValue::Array(items)) if !want.is_array() => items.iter().any(|v| v == want),
            Some(v) => v == want,
            None => want.is_null(),
        })
    }
}

pub(crate) fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a JsonValue> {
    let mut parts = path.split('.');
    let mut cur = doc.get(parts.next()?)?;
    for p in parts {
        cur = cur.as_object()?.get(p)?;
    }
    Some(cur)
}

/// Assign `value` at a dotted path, creating intermediate objects. A non-object
/// intermediate is replaced. Returns true if the document changed.
pub(crate) fn set_path(doc: &mut Document, path: &str, value: JsonValue) -> bool {
    let mut segments: Vec<&str> = path.split('.').collect();
    let Some(last) = segments.pop() else { return false; };
    let mut cur = doc;
    for seg in segments {
        let slot = cur.entry(seg.to_string()).or_insert_with(|| JsonValue::Object(Document::new()));
        if !slot.is_object() {
            *slot = JsonValue::Object(Document::new());
        }
        cur = match slot.as_object_mut() {
            Some(m) => m,
            None => return false,
        };
    }
    if cur.get(last) == Some(&value) { return false; }
    cur.insert(last.to_string(), value);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: JsonValue) -> Document { v.as_object().cloned().unwrap() }

    #[test]
    fn dotted_paths_and_arrays_match() {
        let d = doc(json!({"partNumber": "FIL-001", "address": {"city": "Plovdiv"}, "compatibleCars": ["BMW", "Audi"]}));
        assert!(Filter::all().matches(&d));
        assert!(Filter::eq("address.city", "Plovdiv").matches(&d));
        assert!(Filter::eq("compatibleCars", "BMW").matches(&d));
        assert!(!Filter::eq("compatibleCars", "Skoda").matches(&d));
        assert!(Filter::eq("partNumber", "FIL-001").and("address.city", "Plovdiv").matches(&d));
        assert!(!Filter::eq("partNumber", "FIL-001").and("address.city", "Sofia").matches(&d));
    }

    #[test]
    fn missing_field_only_matches_null() {
        let d = doc(json!({"a": 1}));
        assert!(!Filter::eq("b", 1).matches(&d));
        assert!(Filter::eq("b", JsonValue::Null).matches(&d));
    }

    #[test]
    fn set_path_creates_nested_objects_and_reports_change() {
        let mut d = doc(json!({"shipping": {"method": "Standard"}, "status": "Processing"}));
        assert!(set_path(&mut d, "shipping.trackingNumber", json!("BG7890123456")));
        assert!(set_path(&mut d, "status", json!("Shipped")));
        assert!(!set_path(&mut d, "status", json!("Shipped")));
        assert_eq!(lookup(&d, "shipping.trackingNumber"), Some(&json!("BG7890123456")));
        assert_eq!(lookup(&d, "shipping.method"), Some(&json!("Standard")));
    }
}
