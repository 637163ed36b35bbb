use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Одна словарная статья. Схема открытая: движок читает только id и два
/// текстовых поля, остальное (grammar, usage, etymology, ...) проходит насквозь.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Строковое значение поля; нестроковые значения не считаются текстом.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn id<'a>(&'a self, fields: &FieldMap) -> Option<&'a str> {
        self.text(&fields.id)
    }

    /// Заголовок: первое непустое строковое поле из `fields.primary`.
    pub fn primary_text<'a>(&'a self, fields: &FieldMap) -> &'a str {
        fields
            .primary
            .iter()
            .filter_map(|k| self.text(k))
            .find(|s| !s.is_empty())
            .unwrap_or("")
    }

    pub fn translation_text<'a>(&'a self, fields: &FieldMap) -> &'a str {
        self.text(&fields.secondary).unwrap_or("")
    }
}

impl TryFrom<Value> for Record {
    type Error = serde_json::Error;

    fn try_from(v: Value) -> Result<Self, Self::Error> {
        serde_json::from_value(v)
    }
}

/// Какие ключи записи играют роль id / заголовка / перевода.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMap {
    pub id: String,
    /// Порядок важен: следующий ключ берётся, если предыдущий пуст или отсутствует.
    pub primary: Vec<String>,
    pub secondary: String,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            id: "objectId".into(),
            primary: vec!["query".into(), "original_form".into()],
            secondary: "translation".into(),
        }
    }
}

impl FieldMap {
    pub fn new(id: impl Into<String>, primary: &[&str], secondary: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            primary: primary.iter().map(|s| s.to_string()).collect(),
            secondary: secondary.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rec(v: Value) -> Record {
        Record::try_from(v).unwrap()
    }

    #[test]
    fn primary_falls_back_when_absent_or_empty() {
        let f = FieldMap::default();
        let a = rec(json!({"objectId": "a", "query": "Дом", "original_form": "дома"}));
        let b = rec(json!({"objectId": "b", "original_form": "дома"}));
        let c = rec(json!({"objectId": "c", "query": "", "original_form": "дома"}));
        let d = rec(json!({"objectId": "d", "query": 7}));

        assert_eq!(a.primary_text(&f), "Дом");
        assert_eq!(b.primary_text(&f), "дома");
        assert_eq!(c.primary_text(&f), "дома");
        assert_eq!(d.primary_text(&f), "");
    }

    #[test]
    fn id_must_be_a_string() {
        let f = FieldMap::default();
        assert_eq!(rec(json!({"objectId": "x1"})).id(&f), Some("x1"));
        assert_eq!(rec(json!({"objectId": 1})).id(&f), None);
    }

    #[test]
    fn unknown_fields_pass_through() {
        let v = json!({
            "objectId": "x",
            "grammar": {"gender": "m", "inflections": ["дома", "дому"]},
            "usage": {"examples": [{"russian": "мой дом", "chinese": "我的家"}]}
        });
        let r = rec(v.clone());
        assert_eq!(serde_json::to_value(&r).unwrap(), v);
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(Record::try_from(json!(["not", "a", "record"])).is_err());
    }
}
