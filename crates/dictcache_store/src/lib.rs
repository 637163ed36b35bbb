pub mod corpus;
pub mod engine;
pub mod error;
pub mod export;
pub mod manifest;
pub mod matcher;
pub mod normalizer;
pub mod record;
pub mod stream;

pub use corpus::{Corpus, FsCorpus, InMemoryCorpus};
pub use engine::{Page, QueryEngine, SearchResult, VerifyReport};
pub use error::{StoreError, StoreResult};
pub use manifest::Manifest;
pub use record::{FieldMap, Record};
pub use stream::ShardStream;
