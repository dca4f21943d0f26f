//! Create/read/update/delete walkthrough over the shop collections. Every
//! call goes through a `GuardedCollection`, so the acting user needs the
//! matching permission for each step.

use chrono::{Days, Utc};
use regex::Regex;
use serde_json::{json, Value};
use tracing::info;

use crate::access::defaults::{CUSTOMERS, ORDERS, PARTS};
use crate::access::{AccessChecker, Operation};
use crate::error::{AppError, AppResult};
use crate::guard::GuardedCollection;
use crate::render;
use crate::storage::{DocStore, Document, Filter};

pub const DEFAULT_ACTOR: &str = "admin_user";
/// User for the closing "this is refused" step.
pub const RESTRICTED_ACTOR: &str = "reports_user";

pub const NEW_PART: &str = "FIL-003";
pub const NEW_CUSTOMER: &str = "C011";
pub const NEW_ORDER: &str = "ORD-011";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrudReport {
    /// (step, affected count) in execution order
    pub steps: Vec<(String, usize)>,
    /// (name, price) of the cheapest parts, ascending
    pub cheapest: Vec<(String, f64)>,
    /// Message of the refused operation, if it was refused
    pub denied: Option<String>,
}

impl CrudReport {
    fn record(&mut self, step: &str, n: usize) {
        println!("{}: {}", step, n);
        self.steps.push((step.to_string(), n));
    }

    pub fn count(&self, step: &str) -> Option<usize> {
        self.steps.iter().find(|(s, _)| s == step).map(|(_, n)| *n)
    }
}

fn object(v: Value) -> Document {
    match v {
        Value::Object(m) => m,
        _ => Document::new(),
    }
}

fn price_of(doc: &Document) -> Option<f64> { doc.get("price").and_then(Value::as_f64) }

fn round_cents(v: f64) -> f64 { (v * 100.0).round() / 100.0 }

fn new_part() -> Document {
    object(json!({
        "partNumber": NEW_PART,
        "name": "Cabin air filter",
        "category": "Filters",
        "manufacturer": "Bosch",
        "price": 18.5,
        "compatibleCars": ["BMW", "Mercedes", "Audi", "VW"],
        "stockQuantity": 25,
        "location": "A1-14",
        "specifications": {"size": "240mm x 190mm", "filterType": "Carbon", "material": "Activated carbon"}
    }))
}

fn new_customer() -> Document {
    object(json!({
        "customerId": NEW_CUSTOMER,
        "firstName": "Alexander",
        "lastName": "Popov",
        "email": "alex.popov@example.com",
        "phone": "0898123456",
        "address": {"street": "56 Maritsa St", "city": "Plovdiv", "postalCode": "4000", "country": "Bulgaria"},
        "registrationDate": Utc::now().date_naive().to_string(),
        "loyaltyPoints": 0,
        "customerType": "retail",
        "carDetails": [{"make": "Ford", "model": "Focus", "year": 2021, "vin": "1FADP3F23HL123456"}]
    }))
}

fn new_order() -> Document {
    let now = Utc::now();
    let today = now.date_naive();
    let eta = today.checked_add_days(Days::new(3)).unwrap_or(today);
    object(json!({
        "orderId": NEW_ORDER,
        "customerId": NEW_CUSTOMER,
        "orderDate": now.to_rfc3339(),
        "status": "Processing",
        "items": [{"partNumber": NEW_PART, "quantity": 1, "priceAtPurchase": 18.5, "discount": 0}],
        "shipping": {"method": "Standard", "cost": 5.0, "trackingNumber": "", "estimatedDelivery": eta.to_string()},
        "payment": {"method": "CreditCard", "transactionId": "TXN-NEW", "amount": 23.5, "status": "Paid"}
    }))
}

/// Every (collection, operation) the walkthrough performs.
pub const REQUIRED: [(&str, Operation); 8] = [
    (PARTS, Operation::Read),
    (PARTS, Operation::Write),
    (PARTS, Operation::Delete),
    (CUSTOMERS, Operation::Read),
    (CUSTOMERS, Operation::Write),
    (CUSTOMERS, Operation::Delete),
    (ORDERS, Operation::Write),
    (ORDERS, Operation::Delete),
];

/// Run the walkthrough as `actor`, then try one delete as `RESTRICTED_ACTOR`.
/// `actor` must hold every permission in `REQUIRED`; otherwise the run stops
/// with `access_denied` before the first write.
pub fn run(store: &DocStore, checker: &AccessChecker, actor: &str) -> AppResult<CrudReport> {
    for (coll, op) in REQUIRED {
        GuardedCollection::new(store, checker, actor, coll).require(op)?;
    }
    let parts = GuardedCollection::new(store, checker, actor, PARTS);
    let customers = GuardedCollection::new(store, checker, actor, CUSTOMERS);
    let orders = GuardedCollection::new(store, checker, actor, ORDERS);
    let mut report = CrudReport::default();

    println!("----- CREATE as {} -----", actor);
    let id = parts.insert_one(new_part())?;
    println!("part {} added with id {}", NEW_PART, id);
    let id = customers.insert_one(new_customer())?;
    println!("customer {} added with id {}", NEW_CUSTOMER, id);
    let id = orders.insert_one(new_order())?;
    println!("order {} added with id {}", NEW_ORDER, id);
    report.record("inserted", 3);

    println!("\n----- READ -----");
    match parts.find_one(&Filter::eq("partNumber", "FIL-001"))? {
        Some(doc) => println!("{}", render::documents_table(&[doc])),
        None => println!("part FIL-001 not found"),
    }
    let brakes = parts.find_where(|d| {
        d.get("category").and_then(Value::as_str) == Some("Brakes") && price_of(d).is_some_and(|p| p >= 70.0)
    })?;
    report.record("brake parts priced 70 or more", brakes.len());
    report.record("parts fitting BMW", parts.count(&Filter::eq("compatibleCars", "BMW"))?);
    let named = Regex::new(r"(?i)filter").map_err(|e| AppError::internal("regex", e.to_string()))?;
    let filters = parts.find_where(|d| d.get("name").and_then(Value::as_str).is_some_and(|n| named.is_match(n)))?;
    report.record("parts with 'filter' in the name", filters.len());

    let mut priced: Vec<(String, f64)> = parts
        .find(&Filter::all())?
        .iter()
        .filter_map(|d| {
            let name = d.get("name").and_then(Value::as_str)?.to_string();
            Some((name, price_of(d)?))
        })
        .collect();
    priced.sort_by(|a, b| a.1.total_cmp(&b.1));
    priced.truncate(5);
    for (name, price) in &priced {
        println!("  {:<32} {:>8.2}", name, price);
    }
    report.cheapest = priced;

    println!("\n----- UPDATE -----");
    let mut set = Document::new();
    set.insert("price".into(), json!(19.99));
    report.record("part price changed", parts.update_one(&Filter::eq("partNumber", NEW_PART), set)?);

    let by_customer = Filter::eq("customerId", NEW_CUSTOMER);
    let points = customers
        .find_one(&by_customer)?
        .and_then(|d| d.get("loyaltyPoints").and_then(Value::as_i64))
        .unwrap_or(0);
    let mut set = Document::new();
    set.insert("loyaltyPoints".into(), json!(points + 20));
    report.record("loyalty points raised", customers.update_one(&by_customer, set)?);

    let mut set = Document::new();
    set.insert("status".into(), json!("Shipped"));
    set.insert("shipping.trackingNumber".into(), json!("BG7890123456"));
    report.record("order shipped", orders.update_one(&Filter::eq("orderId", NEW_ORDER), set)?);

    let mut repriced = 0;
    for doc in parts.find(&Filter::eq("manufacturer", "Bosch"))? {
        let (Some(id), Some(price)) = (doc.get("_id").cloned(), price_of(&doc)) else { continue };
        let mut set = Document::new();
        set.insert("price".into(), json!(round_cents(price * 1.05)));
        repriced += parts.update_one(&Filter::eq("_id", id), set)?;
    }
    report.record("Bosch parts repriced", repriced);

    let by_part = Filter::eq("partNumber", NEW_PART);
    let mut cars = parts
        .find_one(&by_part)?
        .and_then(|d| d.get("compatibleCars").and_then(Value::as_array).cloned())
        .unwrap_or_default();
    cars.push(json!("Skoda"));
    let mut set = Document::new();
    set.insert("compatibleCars".into(), Value::Array(cars));
    report.record("compatibility added", parts.update_one(&by_part, set)?);

    println!("\n----- DELETE -----");
    report.record("part deleted", parts.delete_one(&by_part)?);
    let out_of_stock = Filter::eq("stockQuantity", 0);
    if parts.count(&out_of_stock)? == 0 {
        println!("no out-of-stock parts, adding a throwaway one");
        parts.insert_one(object(json!({"partNumber": "TEST-DELETE", "name": "Throwaway part", "stockQuantity": 0})))?;
    }
    report.record("out-of-stock parts deleted", parts.delete_many(&out_of_stock)?);
    report.record("order deleted", orders.delete_one(&Filter::eq("orderId", NEW_ORDER))?);
    report.record("customer deleted", customers.delete_one(&by_customer)?);

    println!("\n----- Refused operation -----");
    let restricted = GuardedCollection::new(store, checker, RESTRICTED_ACTOR, PARTS);
    match restricted.delete_one(&Filter::eq("partNumber", "FIL-001")) {
        Err(e) if e.is_access_denied() => {
            println!("{}", e.message());
            report.denied = Some(e.message().to_string());
        }
        Err(e) => return Err(e),
        Ok(n) => println!("{} unexpectedly deleted {} parts", RESTRICTED_ACTOR, n),
    }

    info!(target: "partshop::demos", "crud demo as '{}' finished: {} steps", actor, report.steps.len());
    Ok(report)
}
