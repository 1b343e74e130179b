use thiserror::Error;

/// Conditions that end an analysis run
#[derive(Error, Debug)]
pub enum QcError {
    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document has no nucleotide sequence to analyze")]
    NoSequences,

    #[error("Protein {0} has no discoverable genomic location")]
    MissingGenomicLocation(String),

    #[error("No sequence in the document owns '{0}'")]
    UnknownIdentity(String),

    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),
}
