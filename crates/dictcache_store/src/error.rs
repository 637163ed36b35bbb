use std::path::PathBuf;

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Ошибки движка. Каждая локальна для одного запроса, ретраев нет.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("manifest not found: {}", path.display())]
    ManifestNotFound { path: PathBuf },

    #[error("malformed manifest {}: {reason}", path.display())]
    MalformedManifest { path: PathBuf, reason: String },

    #[error("failed to read shard {shard}: {reason}")]
    ShardRead { shard: String, reason: String },

    #[error("record not found: {id}")]
    RecordNotFound { id: String },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("scan cancelled")]
    Cancelled,
}

impl StoreError {
    pub fn shard_read(shard: impl Into<String>, reason: impl ToString) -> Self {
        StoreError::ShardRead {
            shard: shard.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        StoreError::MalformedManifest {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Манифест отсутствует или запись с таким id не найдена.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::ManifestNotFound { .. } | StoreError::RecordNotFound { .. }
        )
    }

    /// Повреждённое состояние на диске (манифест или шард).
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            StoreError::MalformedManifest { .. } | StoreError::ShardRead { .. }
        )
    }
}
