//! MovingAI `.map` format parser.
//!
//! Expected layout:
//!
//! ```text
//! type octile
//! height N
//! width M
//! map
//! <N lines of M characters>
//! ```
//!
//! `.`, `G`, and `S` are traversable; every other character (`@`, `T`, `O`,
//! `W`, …) is an obstacle.  Trailing lines after the grid body are ignored.

use std::path::Path;

use mapd_core::Grid;

use crate::IoError;

/// Parse the content of a MovingAI `.map` file into a [`Grid`].
pub fn parse_map(input: &str) -> Result<Grid, IoError> {
    let mut lines = input.lines();

    // ── Header ────────────────────────────────────────────────────────────
    let mut height: Option<u32> = None;
    let mut width: Option<u32> = None;

    for line in lines.by_ref() {
        let line = line.trim();
        if line.eq_ignore_ascii_case("map") {
            break;
        }
        if let Some(rest) = line.strip_prefix("height ") {
            height = Some(parse_dim("height", rest)?);
        } else if let Some(rest) = line.strip_prefix("width ") {
            width = Some(parse_dim("width", rest)?);
        }
        // The `type` line carries no information we use.
    }

    let height = height.ok_or(IoError::MissingHeader("height"))?;
    let width = width.ok_or(IoError::MissingHeader("width"))?;

    // ── Grid body ─────────────────────────────────────────────────────────
    let mut cells: Vec<bool> = Vec::with_capacity((height * width) as usize);
    let mut rows: u32 = 0;

    for line in lines {
        if rows >= height {
            break;
        }
        let before = cells.len();
        cells.extend(line.chars().map(traversable));
        let got = (cells.len() - before) as u32;
        if got != width {
            return Err(IoError::RowWidthMismatch { row: rows, expected: width, got });
        }
        rows += 1;
    }

    if rows < height {
        return Err(IoError::RowCountMismatch { expected: height, got: rows });
    }

    Grid::from_cells(height, width, cells)
        .ok_or(IoError::RowCountMismatch { expected: height, got: rows })
}

/// Read and parse a `.map` file from disk.
pub fn load_map(path: &Path) -> Result<Grid, IoError> {
    parse_map(&std::fs::read_to_string(path)?)
}

fn traversable(ch: char) -> bool {
    matches!(ch, '.' | 'G' | 'S')
}

fn parse_dim(field: &'static str, value: &str) -> Result<u32, IoError> {
    value
        .trim()
        .parse()
        .map_err(|_| IoError::InvalidHeader { field, value: value.to_string() })
}
