use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Per-file analysis errors
// ---------------------------------------------------------------------------

/// Everything that can go wrong while turning one export file into results.
///
/// All variants are file-scoped: the batch loop records them and moves on
/// to the next file.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("{}: byte 0x{byte:02x} at offset {offset} is not ASCII text", path.display())]
    Encoding {
        path: PathBuf,
        offset: usize,
        byte: u8,
    },

    #[error("reading {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{file}: peak {peak}, slice row {row}: '{token}' is not a number")]
    NumericParse {
        file: String,
        peak: usize,
        row: usize,
        token: String,
    },

    #[error("{file}: peak {peak}, slice row {row} has {found} fields, expected {expected}")]
    RaggedPeak {
        file: String,
        peak: usize,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("{file}: peak {peak} has no column {column}")]
    MissingColumn {
        file: String,
        peak: usize,
        column: usize,
    },

    #[error("{file}: normalized area maximum is zero, nothing to plot")]
    EmptyDistribution { file: String },
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;

impl AnalysisError {
    /// Short category name, used to group failures in batch summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::NotFound { .. } => "not found",
            AnalysisError::Encoding { .. } => "encoding",
            AnalysisError::Io { .. } => "io",
            AnalysisError::NumericParse { .. } => "numeric parse",
            AnalysisError::RaggedPeak { .. } => "ragged peak",
            AnalysisError::MissingColumn { .. } => "missing column",
            AnalysisError::EmptyDistribution { .. } => "empty distribution",
        }
    }
}
