use crate::error::{StoreError, StoreResult};
use crate::normalizer::normalize;
use crate::record::{FieldMap, Record};

/// Подстрочный предикат: нормализованный запрос входит в заголовок или перевод.
pub struct Matcher<'a> {
    fields: &'a FieldMap,
    needle: String,
}

impl<'a> Matcher<'a> {
    /// Пустой (после trim) запрос отвергается здесь, до всякого чтения шардов.
    pub fn new(fields: &'a FieldMap, query: &str) -> StoreResult<Self> {
        let needle = normalize(query.trim());
        if needle.is_empty() {
            return Err(StoreError::InvalidQuery("missing q".into()));
        }
        Ok(Self { fields, needle })
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }

    pub fn matches(&self, rec: &Record) -> bool {
        matches(rec, self.fields, &self.needle)
    }
}

pub fn matches(rec: &Record, fields: &FieldMap, normalized_query: &str) -> bool {
    if normalize(rec.primary_text(fields)).contains(normalized_query) {
        return true;
    }
    normalize(rec.translation_text(fields)).contains(normalized_query)
}
