// path: crates/broker/src/config.rs
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use dictcache_store::manifest::DEFAULT_MANIFEST_NAME;
use dictcache_store::{FieldMap, FsCorpus, QueryEngine};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct BrokerConfig {
    pub addr: String,
    pub export_dir: String,
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,
    /// Дедлайн на один скан; None — без ограничения
    #[serde(default)]
    pub deadline_ms: Option<u64>,
    #[serde(default = "default_true")]
    pub verify_on_start: bool,
    #[serde(default)]
    pub fields: FieldMap,
}

fn default_manifest_name() -> String { DEFAULT_MANIFEST_NAME.to_string() }
fn default_true() -> bool { true }

impl BrokerConfig {
    pub fn from_env() -> Self {
        let addr = std::env::var("DC_ADDR").unwrap_or_else(|_| {
            let port = std::env::var("PORT").ok().and_then(|s| s.parse::<u16>().ok()).unwrap_or(3000);
            format!("0.0.0.0:{port}")
        });
        let export_dir = std::env::var("DC_EXPORT_DIR").unwrap_or_else(|_| "exports".into());
        let manifest_name = std::env::var("DC_MANIFEST").unwrap_or_else(|_| default_manifest_name());
        let deadline_ms = std::env::var("DC_DEADLINE_MS").ok().and_then(|s| s.parse().ok());
        let verify_on_start = std::env::var("DC_VERIFY_ON_START").ok().map(|s| parse_bool(&s)).unwrap_or(true);

        let mut fields = FieldMap::default();
        if let Ok(id) = std::env::var("DC_FIELD_ID") {
            fields.id = id;
        }
        if let Ok(list) = std::env::var("DC_FIELD_PRIMARY") {
            let primary: Vec<String> = list.split(',').map(str::trim).filter(|s| !s.is_empty()).map(String::from).collect();
            if !primary.is_empty() {
                fields.primary = primary;
            }
        }
        if let Ok(sec) = std::env::var("DC_FIELD_SECONDARY") {
            fields.secondary = sec;
        }

        Self { addr, export_dir, manifest_name, deadline_ms, verify_on_start, fields }
    }

    /// Для тестов и встраивания: всё по умолчанию, кроме каталога экспорта.
    pub fn for_export_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            addr: "127.0.0.1:0".into(),
            export_dir: dir.into().to_string_lossy().to_string(),
            manifest_name: default_manifest_name(),
            deadline_ms: None,
            verify_on_start: false,
            fields: FieldMap::default(),
        }
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    pub fn build_engine(&self) -> QueryEngine {
        let corpus = FsCorpus::new(&self.export_dir).with_manifest_name(&self.manifest_name);
        QueryEngine::new(Arc::new(corpus)).with_fields(self.fields.clone())
    }
}

fn parse_bool(s: &str) -> bool {
    !matches!(s.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off")
}
