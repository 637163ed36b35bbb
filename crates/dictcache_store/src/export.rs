use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::manifest::{Manifest, DEFAULT_MANIFEST_NAME};
use crate::record::Record;

/// Раскладывает записи по шардам `<name>.<n>.json` и пишет манифест.
/// Для офлайн-сборки экспорта, тестов и бенчей; сервис каталог не пишет.
pub struct ExportWriter {
    out_dir: PathBuf,
    name: String,
    manifest_name: String,
    shard_size: usize,
}

impl ExportWriter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            name: "DictionaryCache".into(),
            manifest_name: DEFAULT_MANIFEST_NAME.into(),
            shard_size: 1000,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_manifest_name(mut self, name: impl Into<String>) -> Self {
        self.manifest_name = name.into();
        self
    }

    pub fn with_shard_size(mut self, n: usize) -> Self {
        self.shard_size = n.max(1);
        self
    }

    pub fn write<I>(&self, records: I) -> Result<Manifest>
    where
        I: IntoIterator<Item = Record>,
    {
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("create {}", self.out_dir.display()))?;

        let mut shards = Vec::new();
        let mut total = 0u64;
        let mut buf: Vec<Record> = Vec::with_capacity(self.shard_size);

        for rec in records {
            buf.push(rec);
            if buf.len() >= self.shard_size {
                total += buf.len() as u64;
                shards.push(self.flush_shard(shards.len(), &buf)?);
                buf.clear();
            }
        }
        if !buf.is_empty() {
            total += buf.len() as u64;
            shards.push(self.flush_shard(shards.len(), &buf)?);
        }

        let manifest = Manifest::new(self.name.clone(), total, shards);
        let path = self.out_dir.join(&self.manifest_name);
        let f = File::create(&path).with_context(|| format!("create {}", path.display()))?;
        let mut w = BufWriter::new(f);
        serde_json::to_writer_pretty(&mut w, &manifest)?;
        w.flush()?;
        Ok(manifest)
    }

    /// Вход — JSONL, пустые строки пропускаются.
    pub fn write_from_jsonl(&self, input: &Path) -> Result<Manifest> {
        let f = File::open(input).with_context(|| format!("open {}", input.display()))?;
        let mut records = Vec::new();
        for (no, line) in BufReader::new(f).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let rec: Record = serde_json::from_str(&line)
                .with_context(|| format!("{}:{}", input.display(), no + 1))?;
            records.push(rec);
        }
        self.write(records)
    }

    fn flush_shard(&self, n: usize, records: &[Record]) -> Result<String> {
        let id = format!("{}.{n}.json", self.name);
        let path = self.out_dir.join(&id);
        let mut w = BufWriter::new(
            File::create(&path).with_context(|| format!("create {}", path.display()))?,
        );
        serde_json::to_writer(&mut w, records)?;
        w.flush()?;
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Corpus, FsCorpus};
    use serde_json::json;

    #[test]
    fn splits_into_shards_and_counts_total() {
        let dir = tempfile::tempdir().unwrap();
        let recs = (0..5).map(|i| Record::try_from(json!({ "objectId": i.to_string() })).unwrap());
        let m = ExportWriter::new(dir.path())
            .with_shard_size(2)
            .write(recs)
            .unwrap();

        assert_eq!(m.total, 5);
        assert_eq!(
            m.shards,
            vec!["DictionaryCache.0.json", "DictionaryCache.1.json", "DictionaryCache.2.json"]
        );

        let c = FsCorpus::new(dir.path());
        assert_eq!(c.load_manifest().unwrap(), m);
        assert_eq!(c.load_shard("DictionaryCache.2.json").unwrap().len(), 1);
    }
}
