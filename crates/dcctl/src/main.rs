// Файл: crates/dcctl/src/main.rs
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use dictcache_store::export::ExportWriter;
use dictcache_store::manifest::DEFAULT_MANIFEST_NAME;
use dictcache_store::{FieldMap, FsCorpus, Page, QueryEngine};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(version, about = "DictionaryCache control: build/search/verify export directories")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Args)]
struct ExportArgs {
    /// Каталог экспорта
    #[arg(long, default_value = "exports")]
    dir: PathBuf,
    #[arg(long, default_value = DEFAULT_MANIFEST_NAME)]
    manifest: String,
    #[arg(long, default_value = "objectId")]
    id_field: String,
    /// Ключи заголовка через запятую, в порядке fallback
    #[arg(long, default_value = "query,original_form")]
    primary_fields: String,
    #[arg(long, default_value = "translation")]
    secondary_field: String,
}

impl ExportArgs {
    fn engine(&self) -> QueryEngine {
        let primary: Vec<&str> = self
            .primary_fields
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        let fields = FieldMap::new(&self.id_field, &primary, &self.secondary_field);
        let corpus = FsCorpus::new(&self.dir).with_manifest_name(&self.manifest);
        QueryEngine::new(Arc::new(corpus)).with_fields(fields)
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Собрать каталог экспорта из JSONL
    Build {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value = "DictionaryCache")]
        name: String,
        #[arg(long, default_value_t = 1000)]
        shard_size: usize,
    },
    /// Подстрочный поиск
    Search {
        #[command(flatten)]
        export: ExportArgs,
        #[arg(long)]
        q: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
    /// Запись по id
    Get {
        #[command(flatten)]
        export: ExportArgs,
        #[arg(long)]
        id: String,
    },
    /// Манифест
    Stats {
        #[command(flatten)]
        export: ExportArgs,
    },
    /// Полный проход: сверка total с содержимым шардов
    Verify {
        #[command(flatten)]
        export: ExportArgs,
        /// Ненулевой код выхода при расхождении
        #[arg(long, default_value_t = false)]
        strict: bool,
        /// Считать повторные id (держит в памяти все id корпуса)
        #[arg(long, default_value_t = false)]
        duplicates: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Build {
            input,
            out,
            name,
            shard_size,
        } => {
            let m = ExportWriter::new(&out)
                .with_name(&name)
                .with_shard_size(shard_size)
                .write_from_jsonl(&input)?;
            eprintln!("wrote {} records in {} shards to {}", m.total, m.shards.len(), out.display());
        }
        Cmd::Search {
            export,
            q,
            limit,
            offset,
        } => {
            let r = export.engine().search(&q, Page::new(limit, offset))?;
            println!("{}", serde_json::to_string_pretty(&r)?);
        }
        Cmd::Get { export, id } => {
            let rec = export.engine().get_by_id(&id)?;
            println!("{}", serde_json::to_string_pretty(&rec)?);
        }
        Cmd::Stats { export } => {
            let m = export.engine().stats()?;
            println!("{}", serde_json::to_string_pretty(&m)?);
        }
        Cmd::Verify {
            export,
            strict,
            duplicates,
        } => {
            let report = export.engine().verify(duplicates)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if strict && !report.total_matches() {
                bail!(
                    "manifest total {} != scanned {}",
                    report.declared_total,
                    report.scanned_total
                );
            }
        }
    }
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
