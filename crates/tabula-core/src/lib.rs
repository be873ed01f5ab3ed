//! tabula-core - UI-agnostic document model + command scripts.

pub mod command;
pub mod document;
pub mod error;

pub use command::{Command, parse_command, parse_script};
pub use document::{Document, OutputMode};
pub use error::{Result, TabulaError};

pub use tabula_engine::engine::Position;
