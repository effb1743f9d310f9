//! Word-first grid construction: rather than filling a fixed template, lay out the best
//! candidates crossword-style and let the grid's shape emerge from wherever they fit.

use std::cmp::Reverse;
use std::collections::{HashMap, VecDeque};

use float_ord::FloatOrd;
use log::{debug, info};

use crate::config::BuildConfig;
use crate::errors::FillError;
use crate::grid::{Cell, Grid};
use crate::lexicon::Lexicon;
use crate::slots::Direction;
use crate::GridCoord;

const ALPHABET_SIZE: usize = 26;

/// A word committed to the grid during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub word: String,
    pub origin: GridCoord,
    pub direction: Direction,
}

impl Placement {
    /// The cells occupied by this placement, in word order.
    pub fn cells(&self) -> impl Iterator<Item = GridCoord> + '_ {
        (0..self.word.len()).map(move |cell_idx| self.direction.step(self.origin, cell_idx))
    }
}

/// The outcome of `GridBuilder::build`.
#[derive(Debug, Clone)]
pub struct BuiltGrid {
    /// The trimmed grid; every cell not covered by a placement is a block.
    pub grid: Grid,

    /// Placed words, with origins relative to `grid`.
    pub placements: Vec<Placement>,

    /// Did we place at least the configured minimum number of words?
    pub success: bool,

    /// The minimum word count this build was held to.
    pub required: usize,
}

impl BuiltGrid {
    /// Convert an unsuccessful build into a `FillError::BuildFailure`.
    pub fn into_result(self) -> Result<BuiltGrid, FillError> {
        if self.success {
            Ok(self)
        } else {
            Err(FillError::BuildFailure {
                placed: self.placements.len(),
                required: self.required,
            })
        }
    }
}

/// How promising a word is as a crossing partner: words with more vowels in the 4-7 letter sweet
/// spot are easiest to hang other words off.
fn crossability(word: &str) -> f32 {
    let length = word.len() as f32;
    let vowel_ratio = word.bytes().filter(|b| b"AEIOU".contains(b)).count() as f32 / length;
    let length_bonus = if (4..=7).contains(&word.len()) { 1.5 } else { 1.0 };
    vowel_ratio * length_bonus * length
}

fn delta(direction: Direction) -> (isize, isize) {
    match direction {
        Direction::Across => (0, 1),
        Direction::Down => (1, 0),
    }
}

/// The working grid for one `build` call.
struct Layout {
    rows: usize,
    cols: usize,
    letters: Vec<Vec<Option<u8>>>,

    /// Whether each cell is already part of an across word and/or a down word.
    usage: Vec<Vec<[bool; 2]>>,

    placements: Vec<Placement>,

    /// For each letter, every (placement index, char index) where it appears.
    letter_index: [Vec<(usize, usize)>; ALPHABET_SIZE],
}

impl Layout {
    fn new(rows: usize, cols: usize) -> Layout {
        Layout {
            rows,
            cols,
            letters: vec![vec![None; cols]; rows],
            usage: vec![vec![[false; 2]; cols]; rows],
            placements: vec![],
            letter_index: std::array::from_fn(|_| vec![]),
        }
    }

    /// The letter at a possibly out-of-bounds location.
    fn letter_at(&self, row: isize, col: isize) -> Option<u8> {
        if row < 0 || col < 0 {
            return None;
        }
        *self.letters.get(row as usize)?.get(col as usize)?
    }

    /// Can `word` be written starting at `origin` in `direction` without conflicting letters,
    /// overlapping a word running the same way, touching a parallel word, or running into
    /// another word at either end? It must cross at least one existing word and add at least
    /// one new letter.
    fn can_place(&self, word: &[u8], (row, col): (isize, isize), direction: Direction) -> bool {
        let (dr, dc) = delta(direction);
        let last = word.len() as isize - 1;
        let (end_row, end_col) = (row + dr * last, col + dc * last);

        if row < 0 || col < 0 || end_row >= self.rows as isize || end_col >= self.cols as isize {
            return false;
        }
        if self.letter_at(row - dr, col - dc).is_some()
            || self.letter_at(end_row + dr, end_col + dc).is_some()
        {
            return false;
        }

        let mut crossings = 0;
        let mut new_letters = 0;
        for (cell_idx, &letter) in word.iter().enumerate() {
            let (r, c) = (row + dr * cell_idx as isize, col + dc * cell_idx as isize);

            match self.letter_at(r, c) {
                Some(existing) => {
                    if existing != letter || self.usage[r as usize][c as usize][direction as usize]
                    {
                        return false;
                    }
                    crossings += 1;
                }
                None => {
                    if self.letter_at(r + dc, c + dr).is_some()
                        || self.letter_at(r - dc, c - dr).is_some()
                    {
                        return false;
                    }
                    new_letters += 1;
                }
            }
        }

        crossings > 0 && new_letters > 0
    }

    /// Find the first valid placement of `word` crossing an existing word, probing each of its
    /// letters against the letter index in order.
    fn find_placement(&self, word: &[u8]) -> Option<(GridCoord, Direction)> {
        for (cell_idx, &letter) in word.iter().enumerate() {
            let Some(occurrences) = self.letter_index.get(letter.wrapping_sub(b'A') as usize)
            else {
                continue;
            };

            for &(placement_idx, other_cell_idx) in occurrences {
                let placed = &self.placements[placement_idx];
                let direction = placed.direction.perpendicular();
                let (r, c) = placed.direction.step(placed.origin, other_cell_idx);
                let (dr, dc) = delta(direction);
                let origin = (
                    r as isize - dr * cell_idx as isize,
                    c as isize - dc * cell_idx as isize,
                );

                if self.can_place(word, origin, direction) {
                    return Some(((origin.0 as usize, origin.1 as usize), direction));
                }
            }
        }

        None
    }

    fn place(&mut self, word: &str, origin: GridCoord, direction: Direction) {
        let placement_idx = self.placements.len();

        for (cell_idx, letter) in word.bytes().enumerate() {
            let (row, col) = direction.step(origin, cell_idx);
            self.letters[row][col] = Some(letter);
            self.usage[row][col][direction as usize] = true;
            self.letter_index[(letter - b'A') as usize].push((placement_idx, cell_idx));
        }

        self.placements.push(Placement {
            word: word.to_string(),
            origin,
            direction,
        });
    }

    /// Cut the layout down to the bounding box of its letters plus one cell of padding, turning
    /// every empty cell into a block.
    fn trim(self) -> (Grid, Vec<Placement>) {
        let occupied = self.placements.iter().flat_map(|placement| placement.cells());
        let (mut top, mut left, mut bottom, mut right) = (self.rows, self.cols, 0, 0);
        for (row, col) in occupied {
            top = top.min(row);
            left = left.min(col);
            bottom = bottom.max(row);
            right = right.max(col);
        }

        let top = top.saturating_sub(1);
        let left = left.saturating_sub(1);
        let bottom = (bottom + 1).min(self.rows - 1);
        let right = (right + 1).min(self.cols - 1);

        let mut grid = Grid::open(bottom - top + 1, right - left + 1);
        for row in top..=bottom {
            for col in left..=right {
                let cell = match self.letters[row][col] {
                    Some(letter) => Cell::Letter(Some(char::from(letter))),
                    None => Cell::Block,
                };
                grid.set_cell((row - top, col - left), cell);
            }
        }

        let placements = self
            .placements
            .into_iter()
            .map(|placement| Placement {
                origin: (placement.origin.0 - top, placement.origin.1 - left),
                ..placement
            })
            .collect();

        (grid, placements)
    }
}

/// Builds a grid around a set of candidate words instead of filling a fixed template.
#[derive(Debug, Clone, Default)]
pub struct GridBuilder {
    config: BuildConfig,
}

impl GridBuilder {
    #[must_use]
    pub fn new(config: BuildConfig) -> GridBuilder {
        GridBuilder { config }
    }

    /// Choose the words to try: the best `top_n` by crossability, with no more than
    /// `max_per_length` of any one length, longest first.
    fn select_candidates<'w>(&self, lexicon: &'w Lexicon) -> Vec<&'w str> {
        let max_length = self.config.max_rows.min(self.config.max_cols);

        let mut scored: Vec<(&str, f32)> = lexicon
            .iter()
            .filter(|word| (2..=max_length).contains(&word.len()))
            .map(|word| (word.string.as_str(), crossability(&word.string)))
            .collect();
        scored.sort_by_key(|&(_, score)| Reverse(FloatOrd(score)));

        let mut count_by_length: HashMap<usize, usize> = HashMap::new();
        let mut selected: Vec<&str> = vec![];
        for (word, _) in scored {
            if selected.len() >= self.config.top_n {
                break;
            }
            let count = count_by_length.entry(word.len()).or_insert(0);
            if *count < self.config.max_per_length {
                *count += 1;
                selected.push(word);
            }
        }

        selected.sort_by_key(|word| Reverse(word.len()));
        selected
    }

    /// Lay out as many of the lexicon's most crossable words as possible. The longest goes
    /// across the middle of the working grid; each later word is attached perpendicular to the
    /// first compatible letter found. Words that don't fit are retried after others are placed,
    /// until the failure budget runs out.
    #[must_use]
    pub fn build(&self, lexicon: &Lexicon) -> BuiltGrid {
        let required = self.config.min_word_count;
        let candidates = self.select_candidates(lexicon);
        info!(
            "Building grid from {} of {} candidate words",
            candidates.len(),
            lexicon.len()
        );

        let Some((&first, rest)) = candidates.split_first() else {
            let mut grid = Grid::open(1, 1);
            grid.set_cell((0, 0), Cell::Block);
            return BuiltGrid {
                grid,
                placements: vec![],
                success: false,
                required,
            };
        };

        let (rows, cols) = (self.config.max_rows, self.config.max_cols);
        let mut layout = Layout::new(rows, cols);
        layout.place(first, (rows / 2, (cols - first.len()) / 2), Direction::Across);

        let mut pending: VecDeque<&str> = rest.iter().copied().collect();
        let failure_budget = 2 * pending.len();
        let mut failures = 0;

        while layout.placements.len() < self.config.target_word_count && failures < failure_budget {
            let Some(word) = pending.pop_front() else {
                break;
            };

            match layout.find_placement(word.as_bytes()) {
                Some((origin, direction)) => layout.place(word, origin, direction),
                None => {
                    debug!("No placement for {word} yet");
                    failures += 1;
                    pending.push_back(word);
                }
            }
        }

        let (grid, placements) = layout.trim();
        let success = placements.len() >= required;
        info!(
            "Placed {} words in a {}x{} grid",
            placements.len(),
            grid.height(),
            grid.width()
        );

        BuiltGrid {
            grid,
            placements,
            success,
            required,
        }
    }
}
