use std::collections::BTreeSet;
use std::fmt;

use crate::error::PuzzleError;

pub const MIN_BOARD_SIZE: usize = 4;
pub const MAX_BOARD_SIZE: usize = 12;

/// A square on the board, 0-indexed from the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Chess-style name, files left to right and ranks top to bottom ("a1" is the top-left).
    pub fn label(&self) -> String {
        let file = (b'a' + self.col as u8) as char;
        format!("{}{}", file, self.row + 1)
    }
}

/// Side length of the board, always within 4..=12.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoardSize(usize);

impl BoardSize {
    pub fn new(n: usize) -> Result<Self, PuzzleError> {
        if (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&n) {
            Ok(Self(n))
        } else {
            Err(PuzzleError::InvalidBoardSize(n.to_string()))
        }
    }

    /// Parses text typed by the player. Surrounding whitespace is ignored.
    pub fn parse(input: &str) -> Result<Self, PuzzleError> {
        let trimmed = input.trim();
        let n = trimmed
            .parse::<usize>()
            .map_err(|_| PuzzleError::InvalidBoardSize(trimmed.to_owned()))?;
        Self::new(n)
    }

    pub const fn get(self) -> usize {
        self.0
    }

    pub fn contains(self, pos: Position) -> bool {
        pos.row < self.0 && pos.col < self.0
    }
}

impl Default for BoardSize {
    fn default() -> Self {
        Self(8)
    }
}

impl fmt::Display for BoardSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Two queens attack each other on a shared row, column or diagonal.
pub fn conflicts(a: Position, b: Position) -> bool {
    a.row == b.row || a.col == b.col || a.row.abs_diff(b.row) == a.col.abs_diff(b.col)
}

/// Every queen that attacks at least one other queen.
///
/// Plain all-pairs scan; boards never hold more than twelve queens.
pub fn find_conflicts(queens: &BTreeSet<Position>) -> BTreeSet<Position> {
    let queens: Vec<Position> = queens.iter().copied().collect();
    let mut result = BTreeSet::new();
    for (i, &a) in queens.iter().enumerate() {
        for &b in &queens[i + 1..] {
            if conflicts(a, b) {
                result.insert(a);
                result.insert(b);
            }
        }
    }
    result
}

/// Whether any queen other than one standing on `cell` attacks it.
pub fn is_threatened(cell: Position, queens: &BTreeSet<Position>) -> bool {
    queens.iter().any(|&q| q != cell && conflicts(q, cell))
}

/// Render-ready view of one square.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellData {
    pub row: usize,
    pub col: usize,
    pub has_queen: bool,
    pub is_conflict: bool,
    pub is_light: bool,
}

impl CellData {
    pub fn new(row: usize, col: usize, has_queen: bool, is_conflict: bool) -> Self {
        Self {
            row,
            col,
            has_queen,
            is_conflict,
            is_light: (row + col) % 2 == 0,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.row, self.col)
    }
}

/// Builds the cell grid row by row.
pub fn build_cells(
    size: usize,
    queens: &BTreeSet<Position>,
    conflicts: &BTreeSet<Position>,
) -> Vec<CellData> {
    let mut cells = Vec::with_capacity(size * size);
    for row in 0..size {
        for col in 0..size {
            let pos = Position::new(row, col);
            cells.push(CellData::new(
                row,
                col,
                queens.contains(&pos),
                conflicts.contains(&pos),
            ));
        }
    }
    cells
}
