//! On-disk layout: one `<collection>.json` array per collection inside the
//! database directory. Writes go to `<collection>.json.tmp` and are renamed.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use super::Document;
use crate::error::{AppError, AppResult};

const EXT: &str = "json";

pub(super) async fn load_dir(dir: &Path) -> AppResult<BTreeMap<String, Vec<Document>>> {
    let mut out = BTreeMap::new();
    let mut rd = match tokio::fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
        Err(e) => return Err(e.into()),
    };
    while let Some(ent) = rd.next_entry().await? {
        let path = ent.path();
        if path.extension().and_then(|s| s.to_str()) != Some(EXT) { continue; }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else { continue; };
        if super::validate_collection_name(stem).is_err() { continue; }
        let bytes = tokio::fs::read(&path).await?;
        let docs: Vec<Document> = serde_json::from_slice(&bytes).map_err(|e| {
            AppError::user("invalid_snapshot", format!("{}: {}", path.display(), e))
        })?;
        debug!(target: "partshop::storage", "load_dir: coll='{}' docs={}", stem, docs.len());
        out.insert(stem.to_string(), docs);
    }
    Ok(out)
}

pub(super) async fn write_all(dir: &Path, collections: &BTreeMap<String, Vec<Document>>) -> AppResult<()> {
    tokio::fs::create_dir_all(dir).await?;
    for (name, docs) in collections {
        let bytes = serde_json::to_vec_pretty(docs)?;
        let path = dir.join(format!("{}.{}", name, EXT));
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
    }
    // Remove files of collections that were dropped since the last flush
    let mut rd = tokio::fs::read_dir(dir).await?;
    while let Some(ent) = rd.next_entry().await? {
        let path = ent.path();
        if path.extension().and_then(|s| s.to_str()) != Some(EXT) { continue; }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            if !collections.contains_key(stem) {
                debug!(target: "partshop::storage", "write_all: removing stale '{}'", path.display());
                tokio::fs::remove_file(&path).await?;
            }
        }
    }
    Ok(())
}
