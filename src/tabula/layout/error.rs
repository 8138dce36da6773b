use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Boxed error produced by an analysis stage implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type returned by the analysis stage traits.
pub type StageResult<T> = std::result::Result<T, BoxError>;

/// Error type covering the failure cases that can occur while reading sheets,
/// wiring the pipeline, building annotations, or persisting them.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when YAML parsing or serialization fails.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Errors bubbled up from the spreadsheet reader implementation.
    #[error("spreadsheet read error: {0}")]
    SheetRead(#[from] calamine::Error),

    /// Errors bubbled up from the CSV reader implementation.
    #[error("CSV read error: {0}")]
    CsvRead(#[from] csv::Error),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the input extension is not a known spreadsheet format.
    #[error("unsupported input file: {0}")]
    UnsupportedInput(PathBuf),

    /// Raised when a workbook does not contain a sheet it advertises.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when the configuration names a component nobody registered.
    #[error("unknown {role} component '{name}'")]
    UnknownComponent { role: &'static str, name: String },

    /// Raised when a block's corners are out of order.
    #[error("invalid block geometry {top}..{bottom}, {left}..{right}")]
    InvalidBlock {
        top: usize,
        bottom: usize,
        left: usize,
        right: usize,
    },

    /// Raised when a block type distribution has no usable candidate.
    #[error("invalid block type distribution: {0}")]
    InvalidBlockType(String),

    /// Raised when a layout graph references nodes or blocks that do not exist.
    #[error("invalid layout graph: {0}")]
    InvalidGraph(String),

    /// Raised when two distinct blocks resolve to the same label.
    #[error("label '{label}' assigned to both block {first} and block {second}")]
    DuplicateLabel {
        label: String,
        first: usize,
        second: usize,
    },

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

/// The analysis step that was running when a sheet failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Classify,
    ExtractBlocks,
    DetectLayout,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Classify => write!(f, "cell classification"),
            Stage::ExtractBlocks => write!(f, "block extraction"),
            Stage::DetectLayout => write!(f, "layout detection"),
        }
    }
}

/// Failure of a single analysis stage on a single sheet.
///
/// These never escape the orchestrator: they are logged and recorded next to
/// the sheet's (possibly partial) results.
#[derive(Debug, Error)]
pub enum StageError {
    #[error("cell classification failed: {0}")]
    Classification(#[source] BoxError),

    #[error("block extraction failed: {0}")]
    Extraction(#[source] BoxError),

    #[error("layout detection failed: {0}")]
    Detection(#[source] BoxError),

    /// The stage panicked instead of returning an error.
    #[error("{stage} panicked: {message}")]
    Panicked { stage: Stage, message: String },
}

impl StageError {
    /// Wraps a stage implementation's error in the variant matching `stage`.
    pub fn from_stage(stage: Stage, source: BoxError) -> Self {
        match stage {
            Stage::Classify => StageError::Classification(source),
            Stage::ExtractBlocks => StageError::Extraction(source),
            Stage::DetectLayout => StageError::Detection(source),
        }
    }

    /// Returns the step that failed.
    pub fn stage(&self) -> Stage {
        match self {
            StageError::Classification(_) => Stage::Classify,
            StageError::Extraction(_) => Stage::ExtractBlocks,
            StageError::Detection(_) => Stage::DetectLayout,
            StageError::Panicked { stage, .. } => *stage,
        }
    }
}
