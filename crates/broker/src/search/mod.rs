use std::sync::Arc;
use std::time::Duration;

use dictcache_store::{Manifest, Page, QueryEngine, Record, SearchResult, StoreResult, VerifyReport};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ServiceError;

pub mod types;

/// Асинхронная обёртка над QueryEngine: каждый вызов — отдельный скан
/// в blocking-пуле со своим токеном отмены.
pub struct SearchCoordinator {
    engine: Arc<QueryEngine>,
    deadline: Option<Duration>,
}

impl SearchCoordinator {
    pub fn new(engine: QueryEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    pub async fn search(&self, query: String, page: Page) -> Result<SearchResult, ServiceError> {
        debug!(q = %query, limit = page.limit, offset = page.offset, "search");
        self.run(move |engine, ct| engine.search_cancellable(&query, page, ct))
            .await
    }

    pub async fn get_by_id(&self, id: String) -> Result<Record, ServiceError> {
        debug!(id = %id, "get_by_id");
        self.run(move |engine, ct| engine.get_by_id_cancellable(&id, ct))
            .await
    }

    pub async fn stats(&self) -> Result<Manifest, ServiceError> {
        self.run(|engine, _| engine.stats()).await
    }

    pub async fn verify(&self) -> Result<VerifyReport, ServiceError> {
        // сверка — служебный полный проход, дедлайн запросов к ней не относится
        let engine = self.engine.clone();
        // только счёт записей: множество всех id на старте не держим
        Ok(tokio::task::spawn_blocking(move || engine.verify(false)).await??)
    }

    async fn run<T, F>(&self, f: F) -> Result<T, ServiceError>
    where
        F: FnOnce(&QueryEngine, &CancellationToken) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let ct = CancellationToken::new();
        // если future брошен (клиент ушёл) или истёк дедлайн — guard отменит скан
        let guard = ct.clone().drop_guard();

        let engine = self.engine.clone();
        let task_ct = ct.clone();
        let handle = tokio::task::spawn_blocking(move || f(&engine, &task_ct));

        let joined = match self.deadline {
            Some(dl) => match tokio::time::timeout(dl, handle).await {
                Ok(j) => j,
                Err(_) => {
                    warn!(deadline_ms = dl.as_millis() as u64, "scan deadline exceeded");
                    return Err(ServiceError::DeadlineExceeded(dl));
                }
            },
            None => handle.await,
        };
        guard.disarm();
        Ok(joined??)
    }
}
