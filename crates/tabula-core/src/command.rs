//! Parser for line-oriented command scripts.
//!
//! One command per line; blank lines and lines starting with `#` are skipped.
//!
//! ```text
//! set A1 10          # cell text is everything after the position
//! set B1 =A1*2
//! get B1             # prints "value<TAB>text"
//! deps A1            # referenced and dependent cells
//! clear A1
//! size
//! values
//! texts
//! ```

use crate::error::{Result, TabulaError};
use tabula_engine::engine::Position;

/// A single document command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Set cell text. Empty text clears the cell.
    Set { pos: Position, text: String },
    Clear { pos: Position },
    Get { pos: Position },
    Deps { pos: Position },
    Size,
    Values,
    Texts,
}

/// Parse a whole script, returning commands paired with their 1-based line numbers.
pub fn parse_script(content: &str) -> Result<Vec<(usize, Command)>> {
    let mut commands = Vec::new();
    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let command = parse_command(line).map_err(|message| TabulaError::Parse {
            line: line_num + 1,
            message,
        })?;
        commands.push((line_num + 1, command));
    }
    Ok(commands)
}

/// Parse one command line.
pub fn parse_command(line: &str) -> std::result::Result<Command, String> {
    let line = line.trim_start().trim_end_matches(['\r', '\n']);
    let (keyword, rest) = line.split_once(' ').unwrap_or((line, ""));

    match keyword.to_ascii_lowercase().as_str() {
        "set" => {
            let (label, text) = rest.split_once(' ').unwrap_or((rest, ""));
            Ok(Command::Set {
                pos: parse_position(label)?,
                text: text.to_string(),
            })
        }
        "clear" => Ok(Command::Clear {
            pos: parse_position(rest.trim())?,
        }),
        "get" => Ok(Command::Get {
            pos: parse_position(rest.trim())?,
        }),
        "deps" => Ok(Command::Deps {
            pos: parse_position(rest.trim())?,
        }),
        "size" | "values" | "texts" if !rest.trim().is_empty() => {
            Err(format!("'{}' takes no arguments", keyword))
        }
        "size" => Ok(Command::Size),
        "values" => Ok(Command::Values),
        "texts" => Ok(Command::Texts),
        "" => Err("Expected a command".to_string()),
        other => Err(format!("Unknown command: {}", other)),
    }
}

fn parse_position(label: &str) -> std::result::Result<Position, String> {
    if label.is_empty() {
        return Err("Expected a cell position".to_string());
    }
    label.parse::<Position>()
}
