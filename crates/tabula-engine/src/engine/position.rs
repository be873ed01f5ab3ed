//! Cell addresses and sheet extents.
//!
//! Provides conversion between spreadsheet-style cell labels
//! (e.g., "A1", "B2", "XFD16384") and zero-indexed row/column coordinates,
//! plus the [`Size`] of the populated area.
//!
//! # Examples
//!
//! ```ignore
//! let pos = Position::from_str("B3").unwrap();
//! assert_eq!(pos.row, 2);  // 0-indexed
//! assert_eq!(pos.col, 1);
//! assert_eq!(pos.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Number of addressable rows.
pub const MAX_ROWS: i32 = 16384;
/// Number of addressable columns (A..XFD).
pub const MAX_COLS: i32 = 16384;

const LETTERS: i32 = 26;
const MAX_POSITION_LENGTH: usize = 17;
const MAX_LETTER_COUNT: usize = 3;

/// A cell address by row and column indices (0-indexed).
///
/// Positions order row-major, which is also the order referenced cells are
/// reported in.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    /// Sentinel for labels that do not name any cell.
    pub const NONE: Position = Position { row: -1, col: -1 };

    pub const fn new(row: i32, col: i32) -> Position {
        Position { row, col }
    }

    /// Whether the position lies inside the addressable sheet area.
    pub fn is_valid(&self) -> bool {
        (0..MAX_ROWS).contains(&self.row) && (0..MAX_COLS).contains(&self.col)
    }

    /// Parse a position from spreadsheet notation (e.g., "A1", "B2", "AA10").
    ///
    /// Only upper-case letters are accepted. Labels that are well formed but
    /// outside the sheet come back as an invalid position rather than `None`
    /// so formulas can still report `#REF!` for them.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(label: &str) -> Option<Position> {
        Self::parse_label(label)
    }

    fn parse_label(label: &str) -> Option<Position> {
        if label.len() > MAX_POSITION_LENGTH {
            return None;
        }
        let caps = label_re().captures(label)?;
        let letters = &caps["letters"];
        let digits = &caps["digits"];

        if letters.len() > MAX_LETTER_COUNT {
            return Some(Position::NONE);
        }
        let col = letters
            .bytes()
            .fold(0i32, |acc, c| acc * LETTERS + (c - b'A') as i32 + 1)
            - 1;
        let Some(row) = digits.parse::<i32>().ok().and_then(|r| r.checked_sub(1)) else {
            return Some(Position::NONE);
        };

        let pos = Position::new(row, col);
        Some(if pos.is_valid() { pos } else { Position::NONE })
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: i32) -> String {
        let mut result = String::new();
        let mut n = col as i64 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % LETTERS as i64) as u8) as char);
            n /= LETTERS as i64;
        }
        result
    }
}

fn label_re() -> &'static Regex {
    static LABEL_RE: OnceLock<Regex> = OnceLock::new();
    LABEL_RE.get_or_init(|| {
        Regex::new(r"^(?<letters>[A-Z]+)(?<digits>[1-9][0-9]*)$")
            .expect("position label regex must compile")
    })
}

impl std::str::FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::parse_label(s) {
            Some(pos) if pos.is_valid() => Ok(pos),
            _ => Err(format!("Invalid cell position: {}", s)),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return f.write_str("#REF!");
        }
        write!(f, "{}{}", Position::col_to_letters(self.col), self.row + 1)
    }
}

/// Extent of the populated area of a sheet.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub rows: i32,
    pub cols: i32,
}

impl Size {
    pub const fn new(rows: i32, cols: i32) -> Size {
        Size { rows, cols }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.rows, self.cols)
    }
}
