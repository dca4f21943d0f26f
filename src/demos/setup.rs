//! Seed the shop collections from `<fixtures>/<collection>.json`.

use std::path::Path;

use tracing::{info, warn};

use crate::access::defaults::SHOP_COLLECTIONS;
use crate::error::{AppError, AppResult};
use crate::fixtures;
use crate::storage::{DocStore, Filter};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetupReport {
    /// (collection, inserted) in collection-name order
    pub seeded: Vec<(String, usize)>,
    /// Shop collections with no seed file
    pub missing: Vec<String>,
}

/// Replace every shop collection that has a seed file with that file's
/// documents. Seed files are validated before anything is cleared, so a bad
/// file leaves the store untouched.
pub fn seed_collections(store: &DocStore, fixtures_dir: &Path) -> AppResult<SetupReport> {
    let files = fixtures::discover_seed_files(fixtures_dir, &SHOP_COLLECTIONS);
    if files.is_empty() {
        return Err(AppError::not_found(
            "no_fixtures",
            format!("no seed files for {} in '{}'", SHOP_COLLECTIONS.join(", "), fixtures_dir.display()),
        ));
    }

    let mut loaded = Vec::with_capacity(files.len());
    for (coll, path) in &files {
        loaded.push((coll.clone(), fixtures::load_documents(path)?));
    }

    let mut report = SetupReport::default();
    for (coll, docs) in loaded {
        let cleared = store.delete_many(&coll, &Filter::all());
        let n = store.insert_many(&coll, docs)?;
        info!(target: "partshop::demos", "seeded '{}': {} documents (cleared {})", coll, n, cleared);
        println!("{} documents added to '{}'", n, coll);
        report.seeded.push((coll, n));
    }
    for coll in SHOP_COLLECTIONS {
        if !report.seeded.iter().any(|(c, _)| c == coll) {
            warn!(target: "partshop::demos", "no seed file for '{}'", coll);
            report.missing.push(coll.to_string());
        }
    }
    Ok(report)
}
