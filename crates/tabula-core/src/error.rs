//! Error types for Tabula core.

use thiserror::Error;

use tabula_engine::engine::SheetError;

/// Errors that can occur while driving a document.
#[derive(Error, Debug)]
pub enum TabulaError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error("Line {line}: {source}")]
    Command {
        line: usize,
        #[source]
        source: SheetError,
    },
}

pub type Result<T> = std::result::Result<T, TabulaError>;
