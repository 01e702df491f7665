use thiserror::Error;

/// Fatal ingestion failure: the corpus could not be read at all.
///
/// Individual unreadable records are not errors; sources report them as
/// [`crate::Row::Malformed`] and the build keeps going.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing column: {column}")]
    MissingColumn { column: String },
}

pub type Result<T> = std::result::Result<T, IngestError>;
