//! Whole-store JSON snapshots on disk.

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::store::Store;
use super::{ErrorKind, Result, ResultExt};
use crate::utils::serialize_date;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotRef<'a> {
    #[serde(serialize_with = "serialize_date")]
    saved_at: DateTime<Utc>,
    database: &'a Store,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snapshot {
    #[serde(default)]
    saved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    database: Store,
}

pub fn encode(store: &Store) -> Result<String> {
    let snapshot = SnapshotRef {
        saved_at: Utc::now(),
        database: store,
    };
    Ok(serde_json::to_string_pretty(&snapshot)?)
}

pub fn decode(doc: &str) -> Result<Store> {
    let snapshot = serde_json::from_str::<Snapshot>(doc)?;
    if let Some(saved_at) = snapshot.saved_at {
        info!(%saved_at, "decoded snapshot");
    }
    let mut store = snapshot.database;
    store.restore_invariants()?;
    Ok(store)
}

/// Writes next to `path` first and renames, so a crash never leaves half a file.
pub fn write(path: &Path, doc: &str) -> Result<()> {
    let staging = path.with_extension("tmp");
    fs::write(&staging, doc).chain_err(|| format!("writing {}", staging.display()))?;
    fs::rename(&staging, path).chain_err(|| format!("renaming onto {}", path.display()))?;
    Ok(())
}

pub fn load(path: &Path) -> Result<Store> {
    let doc = fs::read_to_string(path)?;
    decode(&doc)
}

/// Startup never fails on a bad snapshot: a missing or corrupt file means an empty store.
pub fn load_or_default(path: &Path) -> Store {
    match load(path) {
        Ok(store) => {
            info!(
                path = %path.display(),
                next_article_id = store.next_article_id(),
                next_comment_id = store.next_comment_id(),
                "loaded snapshot"
            );
            store
        }
        Err(e) => {
            match e.kind() {
                ErrorKind::Io(err) if err.kind() == io::ErrorKind::NotFound => {
                    info!(path = %path.display(), "no snapshot found, starting empty")
                }
                _ => warn!(path = %path.display(), error = %e, "unreadable snapshot, starting empty"),
            }
            Store::default()
        }
    }
}
