use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::corpus::Corpus;
use crate::error::{StoreError, StoreResult};
use crate::manifest::Manifest;
use crate::record::Record;

/// Ленивый поток записей по всем шардам в порядке манифеста.
///
/// В памяти держится ровно один шард: предыдущий освобождается до загрузки
/// следующего. Ошибка шарда завершает поток (повреждённые шарды не пропускаются).
/// Рестарт = новый `ShardStream::open`.
pub struct ShardStream<'a, C: Corpus + ?Sized> {
    corpus: &'a C,
    pending: std::vec::IntoIter<String>,
    current: std::vec::IntoIter<Record>,
    cancel: Option<CancellationToken>,
    shards_loaded: usize,
    done: bool,
}

impl<'a, C: Corpus + ?Sized> ShardStream<'a, C> {
    pub fn open(corpus: &'a C, manifest: &Manifest) -> Self {
        Self {
            corpus,
            pending: manifest.shards.clone().into_iter(),
            current: Vec::new().into_iter(),
            cancel: None,
            shards_loaded: 0,
            done: false,
        }
    }

    /// Токен проверяется перед загрузкой каждого шарда.
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn shards_loaded(&self) -> usize {
        self.shards_loaded
    }

    fn advance_shard(&mut self) -> Option<StoreResult<()>> {
        let shard = self.pending.next()?;

        if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
            debug!(shard = %shard, "scan cancelled before shard load");
            return Some(Err(StoreError::Cancelled));
        }

        // отпускаем прошлый шард до чтения нового
        self.current = Vec::new().into_iter();

        match self.corpus.load_shard(&shard) {
            Ok(records) => {
                self.shards_loaded += 1;
                self.current = records.into_iter();
                Some(Ok(()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

impl<C: Corpus + ?Sized> Iterator for ShardStream<'_, C> {
    type Item = StoreResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            if let Some(rec) = self.current.next() {
                return Some(Ok(rec));
            }
            match self.advance_shard() {
                Some(Ok(())) => continue,
                Some(Err(e)) => {
                    self.done = true;
                    self.current = Vec::new().into_iter();
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    return None;
                }
            }
        }
    }
}

impl<C: Corpus + ?Sized> std::iter::FusedIterator for ShardStream<'_, C> {}
