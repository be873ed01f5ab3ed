use serde::Deserialize;
use tabula_engine::engine::{RenderOptions, Sheet};

/// Which rendering of the sheet a host prints or exports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    #[default]
    Values,
    Texts,
}

/// UI-agnostic document state for the spreadsheet.
#[derive(Debug, Default)]
pub struct Document {
    /// The sheet: cells, dependency graph and populated extent
    pub sheet: Sheet,
    /// Delimiter and other rendering options
    pub render: RenderOptions,
    /// Whether the sheet has been modified
    pub modified: bool,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty document that renders with the given options.
    pub fn with_render_options(render: RenderOptions) -> Self {
        Document {
            render,
            ..Self::default()
        }
    }
}
