use std::path::{Component, Path};

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Имя манифеста по умолчанию (так его пишет экспорт).
pub const DEFAULT_MANIFEST_NAME: &str = "DictionaryCache.index.json";

/// Манифест экспорта:
/// {
///   "className": "DictionaryCache",
///   "total": 12345,
///   "shards": ["DictionaryCache.0.json", "DictionaryCache.1.json"]
/// }
/// Вместо `className` допускается `collectionName`. Ключ имени и лишние ключи
/// отдаются через stats под теми именами, под которыми записаны.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    #[serde(rename = "className", default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub total: u64,
    pub shards: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Manifest {
    pub fn new(class_name: impl Into<String>, total: u64, shards: Vec<String>) -> Self {
        Self {
            class_name: Some(class_name.into()),
            total,
            shards,
            extra: serde_json::Map::new(),
        }
    }

    /// Имя коллекции: `className`, иначе `collectionName`.
    pub fn collection_name(&self) -> Option<&str> {
        self.class_name
            .as_deref()
            .or_else(|| self.extra.get("collectionName").and_then(|v| v.as_str()))
    }

    /// Разбор содержимого файла манифеста. `path` нужен только для текста ошибки.
    pub fn parse(path: &Path, data: &[u8]) -> StoreResult<Self> {
        let m: Manifest =
            serde_json::from_slice(data).map_err(|e| StoreError::malformed(path, e))?;
        m.validate(path)?;
        Ok(m)
    }

    /// Шарды должны лежать внутри каталога экспорта.
    pub fn validate(&self, path: &Path) -> StoreResult<()> {
        for shard in &self.shards {
            if !is_contained(shard) {
                return Err(StoreError::malformed(
                    path,
                    format!("shard identifier {shard:?} escapes the export directory"),
                ));
            }
        }
        Ok(())
    }
}

fn is_contained(shard: &str) -> bool {
    if shard.trim().is_empty() {
        return false;
    }
    Path::new(shard)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p() -> &'static Path {
        Path::new("exports/DictionaryCache.index.json")
    }

    #[test]
    fn parses_export_format() {
        let raw = br#"{"className":"DictionaryCache","total":2,"shards":["a.json","b.json"]}"#;
        let m = Manifest::parse(p(), raw).unwrap();
        assert_eq!(m.collection_name(), Some("DictionaryCache"));
        assert_eq!(m.total, 2);
        assert_eq!(m.shards, vec!["a.json", "b.json"]);
    }

    #[test]
    fn accepts_collection_name_alias_and_keeps_extra_keys() {
        let raw = br#"{"collectionName":"X","total":0,"shards":[],"exportedAt":"2024-05-01"}"#;
        let m = Manifest::parse(p(), raw).unwrap();
        assert_eq!(m.collection_name(), Some("X"));
        assert_eq!(m.extra["exportedAt"], "2024-05-01");
    }

    #[test]
    fn serializes_back_to_the_same_keys() {
        for raw in [
            r#"{"collectionName":"X","total":0,"shards":[],"exportedAt":"2024-05-01"}"#,
            r#"{"className":"DictionaryCache","total":2,"shards":["a.json","b.json"]}"#,
            r#"{"total":0,"shards":[]}"#,
        ] {
            let m = Manifest::parse(p(), raw.as_bytes()).unwrap();
            let back = serde_json::to_value(&m).unwrap();
            let orig: serde_json::Value = serde_json::from_str(raw).unwrap();
            assert_eq!(back, orig, "{raw}");
        }

        let m = Manifest::parse(p(), br#"{"total":0,"shards":[]}"#).unwrap();
        assert_eq!(m.collection_name(), None);
    }

    #[test]
    fn missing_shards_is_malformed() {
        let err = Manifest::parse(p(), br#"{"className":"X","total":1}"#).unwrap_err();
        assert!(matches!(err, StoreError::MalformedManifest { .. }));
    }

    #[test]
    fn wrong_types_are_malformed() {
        let err = Manifest::parse(p(), br#"{"total":"many","shards":"a.json"}"#).unwrap_err();
        assert!(matches!(err, StoreError::MalformedManifest { .. }));

        let err = Manifest::parse(p(), br#"{"total":-1,"shards":[]}"#).unwrap_err();
        assert!(matches!(err, StoreError::MalformedManifest { .. }));
    }

    #[test]
    fn rejects_escaping_shard_paths() {
        for bad in [r#""../secret.json""#, r#""/etc/passwd""#, r#""""#, r#""a/../../b""#] {
            let raw = format!(r#"{{"total":0,"shards":[{bad}]}}"#);
            let err = Manifest::parse(p(), raw.as_bytes()).unwrap_err();
            assert!(
                matches!(err, StoreError::MalformedManifest { .. }),
                "{bad} should be rejected"
            );
        }
        let ok = br#"{"total":0,"shards":["part/0.json","./1.json"]}"#;
        assert!(Manifest::parse(p(), ok).is_ok());
    }
}
