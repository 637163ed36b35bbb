use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::manifest::{Manifest, DEFAULT_MANIFEST_NAME};
use crate::record::Record;

/// Источник корпуса: манифест + загрузка шарда целиком.
/// Реализации не кэшируют: каждый вызов читает хранилище заново.
pub trait Corpus: Send + Sync + 'static {
    fn load_manifest(&self) -> StoreResult<Manifest>;
    /// Шард грузится атомарно: либо все записи, либо `ShardRead`.
    fn load_shard(&self, shard: &str) -> StoreResult<Vec<Record>>;
}

/// Каталог экспорта на диске.
#[derive(Debug, Clone)]
pub struct FsCorpus {
    export_dir: PathBuf,
    manifest_name: String,
}

impl FsCorpus {
    pub fn new(export_dir: impl Into<PathBuf>) -> Self {
        Self {
            export_dir: export_dir.into(),
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
        }
    }

    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.export_dir.join(&self.manifest_name)
    }
}

impl Corpus for FsCorpus {
    fn load_manifest(&self) -> StoreResult<Manifest> {
        let path = self.manifest_path();
        let data = match std::fs::read(&path) {
            Ok(d) => d,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::ManifestNotFound { path });
            }
            Err(e) => return Err(StoreError::malformed(path, format!("unreadable: {e}"))),
        };
        Manifest::parse(&path, &data)
    }

    fn load_shard(&self, shard: &str) -> StoreResult<Vec<Record>> {
        let path = self.export_dir.join(shard);
        let data = std::fs::read(&path).map_err(|e| StoreError::shard_read(shard, e))?;
        let records = parse_shard(shard, &data)?;
        debug!(shard, records = records.len(), bytes = data.len(), "shard loaded");
        Ok(records)
    }
}

/// `*.jsonl` / `*.ndjson` — запись на строку, иначе JSON-массив записей.
pub fn parse_shard(shard: &str, data: &[u8]) -> StoreResult<Vec<Record>> {
    if is_line_delimited(shard) {
        let text = std::str::from_utf8(data).map_err(|e| StoreError::shard_read(shard, e))?;
        let mut out = Vec::new();
        for (no, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let rec: Record = serde_json::from_str(line)
                .map_err(|e| StoreError::shard_read(shard, format!("line {}: {e}", no + 1)))?;
            out.push(rec);
        }
        Ok(out)
    } else {
        serde_json::from_slice(data).map_err(|e| StoreError::shard_read(shard, e))
    }
}

fn is_line_delimited(shard: &str) -> bool {
    matches!(
        Path::new(shard).extension().and_then(|e| e.to_str()),
        Some("jsonl") | Some("ndjson")
    )
}

/// In-memory корпус для тестов и бенчей. Считает обращения к хранилищу.
#[derive(Clone, Default)]
pub struct InMemoryCorpus {
    manifest: Arc<Mutex<Option<Manifest>>>,
    shards: Arc<Mutex<HashMap<String, Vec<Record>>>>,
    manifest_loads: Arc<AtomicUsize>,
    shard_loads: Arc<AtomicUsize>,
}

impl InMemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Кладёт шарды в указанном порядке и пересобирает манифест с точным total.
    pub fn from_shards(name: &str, shards: Vec<(String, Vec<Record>)>) -> Self {
        let corpus = Self::new();
        let total = shards.iter().map(|(_, r)| r.len() as u64).sum();
        let ids = shards.iter().map(|(id, _)| id.clone()).collect();
        for (id, recs) in shards {
            corpus.insert_shard(id, recs);
        }
        corpus.set_manifest(Manifest::new(name, total, ids));
        corpus
    }

    pub fn set_manifest(&self, m: Manifest) {
        *lock(&self.manifest) = Some(m);
    }

    pub fn insert_shard(&self, id: impl Into<String>, records: Vec<Record>) {
        lock(&self.shards).insert(id.into(), records);
    }

    pub fn remove_shard(&self, id: &str) {
        lock(&self.shards).remove(id);
    }

    pub fn manifest_loads(&self) -> usize {
        self.manifest_loads.load(Ordering::Relaxed)
    }

    pub fn shard_loads(&self) -> usize {
        self.shard_loads.load(Ordering::Relaxed)
    }
}

impl Corpus for InMemoryCorpus {
    fn load_manifest(&self) -> StoreResult<Manifest> {
        self.manifest_loads.fetch_add(1, Ordering::Relaxed);
        lock(&self.manifest)
            .clone()
            .ok_or_else(|| StoreError::ManifestNotFound {
                path: PathBuf::from("mem://manifest"),
            })
    }

    fn load_shard(&self, shard: &str) -> StoreResult<Vec<Record>> {
        self.shard_loads.fetch_add(1, Ordering::Relaxed);
        lock(&self.shards)
            .get(shard)
            .cloned()
            .ok_or_else(|| StoreError::shard_read(shard, "no such shard"))
    }
}

// отравленный mutex в тестовом корпусе не страшен: данные только читаются
fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|e| e.into_inner())
}
