use std::path::PathBuf;
use std::sync::{Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, warn};

use crate::config::Config;

pub mod snapshot;
pub mod store;


pub use self::store::Store;

error_chain! {
    foreign_links {
        Io(::std::io::Error);
        Json(::serde_json::Error);
    }
}

/// The shared handle every request goes through: the store behind a
/// reader/writer lock, plus where (if anywhere) snapshots are written.
pub struct Db {
    store: RwLock<Store>,
    snapshot: Option<PathBuf>,
    // Held for the whole read-serialize-write cycle so snapshots land in order.
    persisting: Mutex<()>,
}

impl Db {
    pub fn new(store: Store, snapshot: Option<PathBuf>) -> Self {
        Db {
            store: RwLock::new(store),
            snapshot,
            persisting: Mutex::new(()),
        }
    }

    pub fn in_memory() -> Self {
        Db::new(Store::default(), None)
    }

    /// Loads the configured snapshot, falling back to an empty store.
    pub fn open(config: &Config) -> Self {
        match config.snapshot_path() {
            Some(path) => Db::new(snapshot::load_or_default(&path), Some(path)),
            None => Db::in_memory(),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Store> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Store> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Best-effort snapshot of the current store. Errors are logged, never returned.
    pub fn persist(&self) {
        let path = match &self.snapshot {
            Some(path) => path,
            None => return,
        };
        let _guard = self.persisting.lock().unwrap_or_else(PoisonError::into_inner);
        let encoded = snapshot::encode(&self.read());
        match encoded.and_then(|doc| snapshot::write(path, &doc)) {
            Ok(()) => debug!(path = %path.display(), "snapshot saved"),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to save snapshot"),
        }
    }
}
