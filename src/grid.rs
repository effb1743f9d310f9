use std::fmt;

use crate::errors::GridError;
use crate::GridCoord;

/// A single square of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Block,

    /// A cell that holds a letter, optionally already resolved to an uppercase ASCII letter.
    Letter(Option<char>),
}

impl Cell {
    #[must_use]
    pub fn is_block(&self) -> bool {
        matches!(self, Cell::Block)
    }

    /// The resolved letter for this cell, if any.
    #[must_use]
    pub fn letter(&self) -> Option<char> {
        match self {
            Cell::Letter(letter) => *letter,
            Cell::Block => None,
        }
    }

    /// The cell with its letter uppercased, or `None` if the letter isn't an ASCII letter.
    fn canonical(self) -> Option<Cell> {
        match self {
            Cell::Letter(Some(ch)) if ch.is_ascii_alphabetic() => {
                Some(Cell::Letter(Some(ch.to_ascii_uppercase())))
            }
            Cell::Letter(Some(_)) => None,
            cell => Some(cell),
        }
    }
}

/// A rectangular grid of cells. Every row has the same length.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    /// Build a grid from rows of cells, checking that it's non-empty and rectangular. Resolved
    /// letters must be ASCII letters and are stored uppercase.
    pub fn new(mut rows: Vec<Vec<Cell>>) -> Result<Grid, GridError> {
        let expected = rows.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(GridError::Empty);
        }

        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != expected)
        {
            return Err(GridError::Ragged { row, expected, found });
        }

        for (row, cells) in rows.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                *cell = match cell.canonical() {
                    Some(canonical) => canonical,
                    None => {
                        let ch = cell.letter().unwrap_or_default();
                        return Err(GridError::InvalidCharacter { ch, row, col });
                    }
                };
            }
        }

        Ok(Grid { rows })
    }

    /// A grid of the given size containing only empty letter cells.
    #[must_use]
    pub fn open(height: usize, width: usize) -> Grid {
        Grid {
            rows: vec![vec![Cell::Letter(None); width.max(1)]; height.max(1)],
        }
    }

    /// Parse a grid from a string template, with `.` representing empty cells, `#` representing
    /// blocks, and letters representing themselves. Blank lines and leading/trailing whitespace
    /// on each line are ignored, so templates can be written as indented string literals.
    pub fn from_template_string(template: &str) -> Result<Grid, GridError> {
        let rows = template
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
            .map(|(row, line)| {
                line.chars()
                    .enumerate()
                    .map(|(col, ch)| match ch {
                        '#' => Ok(Cell::Block),
                        '.' => Ok(Cell::Letter(None)),
                        ch if ch.is_ascii_alphabetic() => {
                            Ok(Cell::Letter(Some(ch.to_ascii_uppercase())))
                        }
                        ch => Err(GridError::InvalidCharacter { ch, row, col }),
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Grid::new(rows)
    }

    /// Render the grid in the same format accepted by `from_template_string`.
    #[must_use]
    pub fn render(&self) -> String {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Cell::Block => '#',
                        Cell::Letter(None) => '.',
                        Cell::Letter(Some(letter)) => *letter,
                    })
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.rows[0].len()
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    #[must_use]
    pub fn cell(&self, (row, col): GridCoord) -> Cell {
        self.rows[row][col]
    }

    /// Replace a cell, uppercasing its letter.
    ///
    /// # Panics
    ///
    /// If `cell` holds a letter that isn't an ASCII letter.
    pub fn set_cell(&mut self, (row, col): GridCoord, cell: Cell) {
        let Some(canonical) = cell.canonical() else {
            panic!("{cell:?} at ({row}, {col}) is not an ASCII letter");
        };
        self.rows[row][col] = canonical;
    }

    #[must_use]
    pub fn is_block(&self, loc: GridCoord) -> bool {
        self.cell(loc).is_block()
    }

    #[must_use]
    pub fn block_count(&self) -> usize {
        self.cells().filter(|(_, cell)| cell.is_block()).count()
    }

    #[must_use]
    pub fn letter_count(&self) -> usize {
        self.height() * self.width() - self.block_count()
    }

    /// Iterate over every cell in row-major order along with its location.
    pub fn cells(&self) -> impl Iterator<Item = (GridCoord, Cell)> + '_ {
        self.rows.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(col, &cell)| ((row, col), cell))
        })
    }

    /// The cell location reached by rotating `loc` 180 degrees around the grid's center.
    #[must_use]
    pub fn mirror(&self, (row, col): GridCoord) -> GridCoord {
        (self.height() - 1 - row, self.width() - 1 - col)
    }

    /// Is the block layout unchanged by a 180 degree rotation?
    #[must_use]
    pub fn is_rotationally_symmetric(&self) -> bool {
        self.cells()
            .all(|(loc, cell)| cell.is_block() == self.is_block(self.mirror(loc)))
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_and_renders_template() {
        let grid = Grid::from_template_string(
            "
            ab#
            ...
            #.c
            ",
        )
        .expect("valid template");

        assert_eq!(grid.height(), 3);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.cell((0, 0)), Cell::Letter(Some('A')));
        assert_eq!(grid.cell((1, 1)), Cell::Letter(None));
        assert!(grid.is_block((2, 0)));
        assert_eq!(grid.block_count(), 2);
        assert_eq!(grid.letter_count(), 7);
        assert_eq!(grid.render(), "AB#\n...\n#.C");
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let err = Grid::from_template_string("...\n..\n...").unwrap_err();
        assert_eq!(err, GridError::Ragged { row: 1, expected: 3, found: 2 });
    }

    #[test]
    fn test_rejects_unknown_characters() {
        let err = Grid::from_template_string("..\n.?").unwrap_err();
        assert_eq!(err, GridError::InvalidCharacter { ch: '?', row: 1, col: 1 });
    }

    #[test]
    fn test_new_checks_letters() {
        let err = Grid::new(vec![vec![Cell::Letter(Some('Ł')), Cell::Letter(None)]]).unwrap_err();
        assert_eq!(err, GridError::InvalidCharacter { ch: 'Ł', row: 0, col: 0 });

        let err = Grid::new(vec![vec![Cell::Block], vec![Cell::Letter(Some('3'))]]).unwrap_err();
        assert_eq!(err, GridError::InvalidCharacter { ch: '3', row: 1, col: 0 });

        let grid = Grid::new(vec![vec![Cell::Letter(Some('a')), Cell::Block]]).unwrap();
        assert_eq!(grid.cell((0, 0)), Cell::Letter(Some('A')));
    }

    #[test]
    fn test_set_cell_uppercases() {
        let mut grid = Grid::open(1, 2);
        grid.set_cell((0, 1), Cell::Letter(Some('q')));
        assert_eq!(grid.render(), ".Q");
    }

    #[test]
    #[should_panic]
    fn test_set_cell_rejects_non_ascii_letters() {
        Grid::open(1, 2).set_cell((0, 0), Cell::Letter(Some('Ł')));
    }

    #[test]
    fn test_rejects_empty_grid() {
        assert_eq!(Grid::from_template_string("\n  \n").unwrap_err(), GridError::Empty);
        assert_eq!(Grid::new(vec![vec![]]).unwrap_err(), GridError::Empty);
    }

    #[test]
    fn test_rotational_symmetry() {
        let symmetric = Grid::from_template_string("#..\n...\n..#").unwrap();
        assert!(symmetric.is_rotationally_symmetric());

        let lopsided = Grid::from_template_string("#..\n...\n#..").unwrap();
        assert!(!lopsided.is_rotationally_symmetric());
    }
}
