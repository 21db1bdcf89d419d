use chrono::{DateTime, Utc};
use std::{
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
    time::SystemTime,
};

use coinlist_core::{
    model::Coin,
    traits::{CacheQuery, CoinStore},
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const SNAPSHOT_VERSION: u32 = 1;
const SNAPSHOT_FILE: &str = "coins.json";
const LOCK_FILE: &str = "LOCK";

#[derive(Debug, Error)]
pub enum LocalError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serde error: {0}")]
    Serde(String),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CachedCoin {
    pub id: String,
    #[serde(flatten)]
    pub coin: Coin,
}

impl CachedCoin {
    fn new(coin: Coin) -> Self {
        Self {
            id: format!("coin_{}", uuid::Uuid::new_v4().simple()),
            coin,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    #[serde(rename = "savedAt")]
    saved_at: DateTime<Utc>,
    entries: Vec<CachedCoin>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            entries: Vec::new(),
        }
    }
}

/// Coin cache persisted as a single JSON snapshot under `<root>/cache`.
pub struct LocalStorage {
    root: PathBuf,
    snapshot: RwLock<Option<Snapshot>>,
}

impl LocalStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref().to_path_buf();
        if let Err(e) = fs::create_dir_all(root.join("cache")) {
            debug!(error = %e, root = %root.display(), "cache dir not created yet");
        }
        Self {
            root,
            snapshot: RwLock::new(None),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cache_dir(&self) -> PathBuf {
        self.root.join("cache")
    }

    fn snapshot_path(&self) -> PathBuf {
        self.cache_dir().join(SNAPSHOT_FILE)
    }

    fn lock_path(&self) -> PathBuf {
        self.cache_dir().join(LOCK_FILE)
    }

    fn ensure_dirs(&self) -> Result<(), LocalError> {
        fs::create_dir_all(self.cache_dir()).map_err(|e| LocalError::Io(e.to_string()))
    }

    /// Entries with their generated ids, in saved order.
    pub fn entries(&self) -> Result<Vec<CachedCoin>, LocalError> {
        self.with_snapshot(|s| s.entries.clone())
    }

    /// Time of the last `save`, if anything has been cached.
    pub fn saved_at(&self) -> Result<Option<DateTime<Utc>>, LocalError> {
        if !self.snapshot_path().exists() && self.snapshot.read().is_none() {
            return Ok(None);
        }
        self.with_snapshot(|s| Some(s.saved_at))
    }

    fn load_snapshot(path: &Path) -> Result<Snapshot, LocalError> {
        if !path.exists() {
            return Ok(Snapshot::default());
        }
        let mut s = String::new();
        File::open(path)
            .map_err(|e| LocalError::Io(e.to_string()))?
            .read_to_string(&mut s)
            .map_err(|e| LocalError::Io(e.to_string()))?;
        let snapshot: Snapshot =
            serde_json::from_str(&s).map_err(|e| LocalError::Serde(e.to_string()))?;
        if snapshot.version != SNAPSHOT_VERSION {
            warn!(
                found = snapshot.version,
                expected = SNAPSHOT_VERSION,
                "coin cache snapshot version mismatch"
            );
        }
        Ok(snapshot)
    }

    fn with_snapshot<T>(&self, f: impl FnOnce(&Snapshot) -> T) -> Result<T, LocalError> {
        {
            let cached = self.snapshot.read();
            if let Some(s) = cached.as_ref() {
                return Ok(f(s));
            }
        }
        let loaded = Self::load_snapshot(&self.snapshot_path())?;
        let out = f(&loaded);
        *self.snapshot.write() = Some(loaded);
        Ok(out)
    }

    fn write_snapshot(&self, snapshot: Snapshot) -> Result<(), LocalError> {
        self.ensure_dirs()?;
        let lockf = File::options()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path())
            .map_err(|e| LocalError::Io(e.to_string()))?;
        fs4::FileExt::lock_exclusive(&lockf).map_err(|e| LocalError::Io(e.to_string()))?;
        let res = (|| {
            let path = self.snapshot_path();
            let data = serde_json::to_vec_pretty(&snapshot)
                .map_err(|e| LocalError::Serde(e.to_string()))?;
            let tmp = self.cache_dir().join(format!(
                ".tmp-coins-{}-{}.json",
                std::process::id(),
                unique_suffix()
            ));
            write_atomic(&tmp, &path, &data)?;
            debug!(
                entries = snapshot.entries.len(),
                path = %path.display(),
                "local cache snapshot committed"
            );
            *self.snapshot.write() = Some(snapshot);
            Ok(())
        })();
        let _ = fs4::FileExt::unlock(&lockf);
        res
    }
}

impl CoinStore for LocalStorage {
    type Error = LocalError;

    fn save(&self, coins: &[Coin]) -> Result<(), Self::Error> {
        debug!(count = coins.len(), "local save requested");
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            entries: coins.iter().cloned().map(CachedCoin::new).collect(),
        };
        self.write_snapshot(snapshot)
    }

    fn load_all(&self) -> Result<Vec<Coin>, Self::Error> {
        let coins = self.with_snapshot(|s| {
            s.entries
                .iter()
                .map(|e| e.coin.clone())
                .collect::<Vec<_>>()
        })?;
        debug!(count = coins.len(), "local load_all returning");
        Ok(coins)
    }

    fn load_filtered(&self, query: &CacheQuery) -> Result<Vec<Coin>, Self::Error> {
        let coins = self.with_snapshot(|s| {
            s.entries
                .iter()
                .filter(|e| query.matches(&e.coin))
                .map(|e| e.coin.clone())
                .collect::<Vec<_>>()
        })?;
        debug!(
            count = coins.len(),
            is_active = ?query.is_active,
            is_new = ?query.is_new,
            coin_type = ?query.coin_type,
            "local load_filtered returning"
        );
        Ok(coins)
    }

    fn clear_all(&self) -> Result<(), Self::Error> {
        debug!("local clear_all requested");
        self.write_snapshot(Snapshot::default())
    }
}

fn write_atomic(tmp: &Path, final_path: &Path, data: &[u8]) -> Result<(), LocalError> {
    {
        let mut f = File::create(tmp).map_err(|e| LocalError::Io(e.to_string()))?;
        f.write_all(data)
            .map_err(|e| LocalError::Io(e.to_string()))?;
        f.sync_all().map_err(|e| LocalError::Io(e.to_string()))?;
    }
    fs::rename(tmp, final_path).map_err(|e| LocalError::Io(e.to_string()))?;
    // fsync directory
    if let Some(dir) = final_path.parent() {
        let dir_file = File::open(dir).map_err(|e| LocalError::Io(e.to_string()))?;
        dir_file
            .sync_all()
            .map_err(|e| LocalError::Io(e.to_string()))?;
    }
    Ok(())
}

fn unique_suffix() -> u128 {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    now.as_nanos()
}
