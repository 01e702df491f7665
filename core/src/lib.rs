//! In-memory vector-space retrieval over a static text corpus.
//!
//! Documents are weighted with the lnc scheme (log tf, no idf, cosine
//! normalized) and queries with ltn (log tf, idf, no normalization); a
//! query's score against a document is the sparse dot product of the two.

pub mod error;
pub mod index;
pub mod ingest;
pub mod query;
pub mod scorer;
pub mod tokenizer;

use serde::{Deserialize, Serialize};

pub use error::IngestError;
pub use index::{BuildStats, DocVector, DocumentFrequency, Index, IndexBuilder, TermWeight};
pub use ingest::{Document, DocumentSource, IngestOptions, Row, SourceFormat};
pub use query::QueryVector;
pub use scorer::{score_and_rank, RankedResult, SearchHit, TOP_K};

/// Position of a document in ingestion order, 0-based.
pub type DocId = u32;

/// Display metadata echoed back alongside ranked results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMeta {
    pub artist: String,
    pub title: String,
}
