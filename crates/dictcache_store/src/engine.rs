use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::corpus::Corpus;
use crate::error::{StoreError, StoreResult};
use crate::manifest::Manifest;
use crate::matcher::Matcher;
use crate::record::{FieldMap, Record};
use crate::stream::ShardStream;

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

/// Параметры страницы после нормализации: limit ∈ [1, 100], offset ≥ 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Page {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self {
            limit: limit.clamp(1, MAX_LIMIT),
            offset,
        }
    }

    /// Разбор сырых значений из query string. Берётся числовой префикс:
    /// "1.9" → 1, "10abc" → 10.
    /// limit: нет / не число / 0 → 20, отрицательный → 1, больше 100 → 100.
    /// offset: нет / не число / отрицательный → 0.
    pub fn parse(limit: Option<&str>, offset: Option<&str>) -> Self {
        let limit = match limit.and_then(parse_int) {
            None | Some(0) => DEFAULT_LIMIT,
            Some(n) if n < 0 => 1,
            Some(n) => usize::try_from(n).unwrap_or(MAX_LIMIT).min(MAX_LIMIT),
        };
        let offset = offset
            .and_then(parse_int)
            .map(|n| usize::try_from(n).unwrap_or(0))
            .unwrap_or(0);
        Self { limit, offset }
    }
}

/// Знак и ведущие цифры; хвост после них игнорируется.
fn parse_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    // слишком длинное число: насыщаем, дальше всё равно clamp
    let n = rest[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -n } else { n })
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchResult {
    pub results: Vec<Record>,
    pub limit: usize,
    pub offset: usize,
    /// Нормализованный запрос.
    pub q: String,
}

/// Итог полной сверки корпуса с манифестом.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VerifyReport {
    pub declared_total: u64,
    pub scanned_total: u64,
    pub per_shard: Vec<ShardCount>,
    pub missing_ids: u64,
    /// Только при `verify(true)`: для подсчёта держится множество всех id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_ids: Option<u64>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ShardCount {
    pub shard: String,
    pub records: u64,
}

impl VerifyReport {
    pub fn total_matches(&self) -> bool {
        self.declared_total == self.scanned_total
    }
}

/// Поиск и выборка поверх корпуса. Состояния между вызовами нет:
/// каждый вызов перечитывает манифест и сканирует шарды заново.
#[derive(Clone)]
pub struct QueryEngine {
    corpus: Arc<dyn Corpus>,
    fields: FieldMap,
}

impl QueryEngine {
    pub fn new(corpus: Arc<dyn Corpus>) -> Self {
        Self {
            corpus,
            fields: FieldMap::default(),
        }
    }

    pub fn with_fields(mut self, fields: FieldMap) -> Self {
        self.fields = fields;
        self
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Свежий поток по текущему манифесту.
    pub fn records(&self) -> StoreResult<ShardStream<'_, dyn Corpus>> {
        let manifest = self.corpus.load_manifest()?;
        Ok(ShardStream::open(&*self.corpus, &manifest))
    }

    pub fn search(&self, query: &str, page: Page) -> StoreResult<SearchResult> {
        self.search_inner(query, page, None)
    }

    pub fn search_cancellable(
        &self,
        query: &str,
        page: Page,
        token: &CancellationToken,
    ) -> StoreResult<SearchResult> {
        self.search_inner(query, page, Some(token))
    }

    fn search_inner(
        &self,
        query: &str,
        page: Page,
        token: Option<&CancellationToken>,
    ) -> StoreResult<SearchResult> {
        let matcher = Matcher::new(&self.fields, query)?;
        let page = Page::new(page.limit, page.offset);

        let mut results = Vec::new();
        let mut skipped = 0usize;
        let mut scanned = 0u64;
        for rec in self.open_stream(token)? {
            let rec = rec?;
            scanned += 1;
            if !matcher.matches(&rec) {
                continue;
            }
            if skipped < page.offset {
                skipped += 1;
                continue;
            }
            results.push(rec);
            if results.len() >= page.limit {
                break;
            }
        }
        debug!(q = matcher.needle(), scanned, hits = results.len(), "search done");

        Ok(SearchResult {
            results,
            limit: page.limit,
            offset: page.offset,
            q: matcher.needle().to_string(),
        })
    }

    pub fn get_by_id(&self, id: &str) -> StoreResult<Record> {
        self.get_by_id_inner(id, None)
    }

    pub fn get_by_id_cancellable(&self, id: &str, token: &CancellationToken) -> StoreResult<Record> {
        self.get_by_id_inner(id, Some(token))
    }

    fn get_by_id_inner(&self, id: &str, token: Option<&CancellationToken>) -> StoreResult<Record> {
        for rec in self.open_stream(token)? {
            let rec = rec?;
            if rec.id(&self.fields) == Some(id) {
                return Ok(rec);
            }
        }
        Err(StoreError::RecordNotFound { id: id.to_string() })
    }

    /// Манифест как есть, без чтения шардов.
    pub fn stats(&self) -> StoreResult<Manifest> {
        self.corpus.load_manifest()
    }

    /// Полный проход: записи по шардам против `total`, записи без id.
    /// С `count_duplicates` ещё и повторные id; память тогда растёт с корпусом.
    /// Расхождение — это отчёт, а не ошибка.
    pub fn verify(&self, count_duplicates: bool) -> StoreResult<VerifyReport> {
        let manifest = self.corpus.load_manifest()?;
        let mut per_shard = Vec::with_capacity(manifest.shards.len());
        let mut seen: Option<HashSet<String>> = count_duplicates.then(HashSet::new);
        let mut missing_ids = 0u64;
        let mut duplicate_ids = 0u64;

        // по шарду за раз, как и в ShardStream
        for shard in &manifest.shards {
            let records = self.corpus.load_shard(shard)?;
            for rec in &records {
                match (rec.id(&self.fields), seen.as_mut()) {
                    (Some(id), Some(seen)) => {
                        if !seen.insert(id.to_string()) {
                            duplicate_ids += 1;
                        }
                    }
                    (Some(_), None) => {}
                    (None, _) => missing_ids += 1,
                }
            }
            per_shard.push(ShardCount {
                shard: shard.clone(),
                records: records.len() as u64,
            });
        }

        let scanned_total = per_shard.iter().map(|s| s.records).sum();
        debug!(
            collection = manifest.collection_name().unwrap_or(""),
            declared = manifest.total,
            scanned = scanned_total,
            "verify done"
        );
        Ok(VerifyReport {
            declared_total: manifest.total,
            scanned_total,
            per_shard,
            missing_ids,
            duplicate_ids: seen.map(|_| duplicate_ids),
        })
    }

    fn open_stream(
        &self,
        token: Option<&CancellationToken>,
    ) -> StoreResult<ShardStream<'_, dyn Corpus>> {
        let stream = self.records()?;
        Ok(match token {
            Some(t) => stream.with_cancel(t.clone()),
            None => stream,
        })
    }
}
