use dictcache_store::Page;
use serde::Deserialize;

/// GET /api/search?q=...&limit=20&offset=0
/// limit/offset приходят строками: нечисловые значения не дают 400, а откатываются к дефолтам.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl SearchParams {
    pub fn query(&self) -> &str {
        self.q.as_deref().unwrap_or("")
    }

    pub fn page(&self) -> Page {
        Page::parse(self.limit.as_deref(), self.offset.as_deref())
    }
}
