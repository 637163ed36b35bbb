// path: crates/dictcache_store/tests/helpers.rs
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use dictcache_store::{FieldMap, InMemoryCorpus, QueryEngine, Record};
use serde_json::{json, Value};

/// Поля в «логических» именах: id / headword / translation
pub fn logical_fields() -> FieldMap {
    FieldMap::new("id", &["headword"], "translation")
}

pub fn rec(v: Value) -> Record {
    Record::try_from(v).expect("record must be an object")
}

pub fn entry(id: &str, headword: &str, translation: &str) -> Record {
    rec(json!({ "id": id, "headword": headword, "translation": translation }))
}

pub fn engine_over(corpus: &InMemoryCorpus) -> QueryEngine {
    QueryEngine::new(Arc::new(corpus.clone())).with_fields(logical_fields())
}

pub fn ids(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.get("id").and_then(|v| v.as_str()).unwrap_or("").to_string())
        .collect()
}

/// Пишет каталог экспорта руками: манифест + файлы шардов как есть.
pub fn write_export(dir: &Path, total: u64, shards: &[(&str, &str)]) {
    let names: Vec<&str> = shards.iter().map(|(n, _)| *n).collect();
    let manifest = json!({ "className": "DictionaryCache", "total": total, "shards": names });
    std::fs::write(
        dir.join("DictionaryCache.index.json"),
        serde_json::to_vec_pretty(&manifest).unwrap(),
    )
    .unwrap();
    for (name, body) in shards {
        std::fs::write(dir.join(name), body).unwrap();
    }
}
