// path: crates/broker/tests/helpers.rs
#![allow(dead_code)]

use std::path::Path;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use broker::config::BrokerConfig;
use broker::http_api::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

pub fn make_router_with_config(cfg: BrokerConfig) -> Router {
    router(AppState::from_config(&cfg))
}

pub fn make_router_for_dir(dir: &Path) -> Router {
    make_router_with_config(BrokerConfig::for_export_dir(dir))
}

/// Экспорт в формате оригинального сервиса: objectId / query / original_form / translation.
pub fn write_sample_export(dir: &Path) {
    let shard0 = json!([
        {"objectId": "w1", "query": "дом", "translation": "房子", "type": "word",
         "grammar": {"part_of_speech": "noun", "gender": "m"}},
        {"objectId": "w2", "query": "кот", "translation": "猫"},
        {"objectId": "w3", "original_form": "домашний", "translation": "家的"}
    ]);
    let shard1 = json!([
        {"objectId": "w4", "query": "Домик", "translation": "小房子"},
        {"objectId": "w5", "query": "собака", "translation": "狗"}
    ]);
    write_export(dir, 5, &[("DictionaryCache.0.json", shard0), ("DictionaryCache.1.json", shard1)]);
}

pub fn write_export(dir: &Path, total: u64, shards: &[(&str, Value)]) {
    let names: Vec<&str> = shards.iter().map(|(n, _)| *n).collect();
    let manifest = json!({ "className": "DictionaryCache", "total": total, "shards": names });
    std::fs::write(
        dir.join("DictionaryCache.index.json"),
        serde_json::to_vec_pretty(&manifest).unwrap(),
    )
    .unwrap();
    for (name, body) in shards {
        std::fs::write(dir.join(name), serde_json::to_vec(body).unwrap()).unwrap();
    }
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let resp = app
        .oneshot(Request::builder().uri(uri).method("GET").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let v: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, v)
}

pub fn object_ids(v: &Value) -> Vec<String> {
    v["results"]
        .as_array()
        .map(|a| a.iter().map(|r| r["objectId"].as_str().unwrap_or("").to_string()).collect())
        .unwrap_or_default()
}
