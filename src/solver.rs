//! Backtracking search for a fill of a grid template.
//!
//! Each step selects the unfilled slot with the fewest viable words (most-constrained first,
//! where a slot with no options is picked immediately so dead ends surface early), tries its
//! candidates best-first with a seeded shuffle inside fixed-size score tiers, and recurses.
//! Retracting a word restores its cells from whatever crossing slots are still filled.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use bit_set::BitSet;
use float_ord::FloatOrd;
use instant::{Duration, Instant};
use log::{debug, info};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use smallvec::SmallVec;

use crate::config::FillConfig;
use crate::errors::{FillError, FillFailure};
use crate::grid::{Cell, Grid};
use crate::lexicon::{Lexicon, Word};
use crate::slots::{discover_slots, SlotConfig};
use crate::{SlotId, WordId, MAX_SLOT_LENGTH};

/// Strategy for ranking the candidate words for a slot; higher scores are tried first.
pub trait Scorer {
    fn score(&self, word: &Word, slot: &SlotConfig) -> f32;
}

/// Rank candidates by their lexicon weight alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightScorer;

impl Scorer for WeightScorer {
    fn score(&self, word: &Word, _slot: &SlotConfig) -> f32 {
        word.weight
    }
}

/// Scrabble point values; rare letters are worth more. Anything not listed counts as 3.
const LETTER_POINTS: [(&str, f32); 7] = [
    ("AEILNORSTU", 1.0),
    ("DG", 2.0),
    ("BCMP", 3.0),
    ("FHVWY", 4.0),
    ("K", 5.0),
    ("JX", 8.0),
    ("QZ", 10.0),
];

fn letter_points(letter: u8) -> f32 {
    LETTER_POINTS
        .iter()
        .find(|(letters, _)| letters.as_bytes().contains(&letter))
        .map_or(3.0, |&(_, points)| points)
}

/// Rank candidates by weight, penalized by the average point value of their letters. Words made
/// of common letters leave their crossing slots more options, so this tends to reduce
/// backtracking at some cost to the weight ordering.
#[derive(Debug, Clone, Copy)]
pub struct LetterScoreScorer {
    /// How many units of weight one point of average letter value costs.
    pub letter_penalty: f32,
}

impl Default for LetterScoreScorer {
    fn default() -> Self {
        LetterScoreScorer { letter_penalty: 1.0 }
    }
}

impl Scorer for LetterScoreScorer {
    fn score(&self, word: &Word, _slot: &SlotConfig) -> f32 {
        if word.is_empty() {
            return word.weight;
        }
        let points: f32 = word.letters.iter().map(|&letter| letter_points(letter)).sum();
        word.weight - self.letter_penalty * points / word.len() as f32
    }
}

/// A struct tracking statistics about the filling process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Statistics {
    pub states: u64,
    pub backtracks: u64,
    pub duration: Duration,
}

/// The result of a fill attempt. On failure this is the deepest partial fill that was reached.
#[derive(Debug, Clone)]
pub struct Fill {
    pub grid: Grid,

    /// The word assigned to each filled slot, keyed by slot id.
    pub words: BTreeMap<SlotId, String>,

    /// Slots without an assigned word; empty on success.
    pub unfilled: Vec<SlotId>,

    pub statistics: Statistics,
}

enum SearchOutcome {
    Solved,
    Exhausted,
    Aborted(FillError),
}

/// The working letters and assignments at the deepest point of the search so far.
#[derive(Debug, Clone)]
struct Snapshot {
    letters: Vec<Vec<Option<u8>>>,
    choices: Vec<Option<WordId>>,
    filled_count: usize,
}

/// The mutable state of one search. Nothing here outlives the `find_fill` call that created it.
struct Search<'a> {
    lexicon: &'a Lexicon,
    slot_configs: &'a [SlotConfig],
    scorer: &'a dyn Scorer,
    config: &'a FillConfig,
    deadline: Option<Instant>,

    /// The current letter in each cell of the grid, if any.
    letters: Vec<Vec<Option<u8>>>,

    /// Cells whose letter was given by the template and must never be cleared.
    pinned: Vec<Vec<bool>>,

    /// The word currently assigned to each slot, indexed by slot id.
    choices: Vec<Option<WordId>>,
    filled: BitSet,

    /// Word ids in use by some slot, bucketed by word length.
    used: Vec<BitSet>,

    rng: SmallRng,
    statistics: Statistics,
    best: Snapshot,
}

impl<'a> Search<'a> {
    fn new(
        grid: &Grid,
        lexicon: &'a Lexicon,
        slot_configs: &'a [SlotConfig],
        scorer: &'a dyn Scorer,
        config: &'a FillConfig,
        start: Instant,
    ) -> Search<'a> {
        let letters: Vec<Vec<Option<u8>>> = grid
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.letter().and_then(|ch| u8::try_from(ch).ok()))
                    .collect()
            })
            .collect();
        let pinned = letters
            .iter()
            .map(|row| row.iter().map(Option::is_some).collect())
            .collect();
        let max_length = slot_configs.iter().map(|slot| slot.length).max().unwrap_or(0);
        let choices = vec![None; slot_configs.len()];

        Search {
            lexicon,
            slot_configs,
            scorer,
            config,
            deadline: config.time_limit.map(|limit| start + limit),
            best: Snapshot {
                letters: letters.clone(),
                choices: choices.clone(),
                filled_count: 0,
            },
            letters,
            pinned,
            choices,
            filled: BitSet::with_capacity(slot_configs.len()),
            used: (0..=max_length).map(|_| BitSet::new()).collect(),
            rng: SmallRng::seed_from_u64(config.seed),
            statistics: Statistics::default(),
        }
    }

    /// The current letters of a slot, with `None` for empty cells.
    fn slot_pattern(&self, slot_config: &SlotConfig) -> SmallVec<[Option<u8>; MAX_SLOT_LENGTH]> {
        slot_config
            .cells
            .iter()
            .map(|&(row, col)| self.letters[row][col])
            .collect()
    }

    /// Words that fit the slot's current pattern and aren't already used elsewhere.
    fn viable_options(&self, slot_config: &SlotConfig) -> BitSet {
        let mut options = self.lexicon.matching_set(&self.slot_pattern(slot_config));
        options.difference_with(&self.used[slot_config.length]);
        options
    }

    /// Pick the unfilled slot with the fewest viable options, preferring lower ids on ties. A slot
    /// with no options at all is returned as soon as it's seen.
    fn select_slot(&self) -> Option<(SlotId, BitSet)> {
        let mut best: Option<(SlotId, BitSet, usize)> = None;

        for slot_config in self.slot_configs {
            if self.filled.contains(slot_config.id) {
                continue;
            }

            let options = self.viable_options(slot_config);
            let option_count = options.len();
            if option_count == 0 {
                return Some((slot_config.id, options));
            }
            if best
                .as_ref()
                .map_or(true, |&(_, _, best_count)| option_count < best_count)
            {
                best = Some((slot_config.id, options, option_count));
            }
        }

        best.map(|(slot_id, options, _)| (slot_id, options))
    }

    /// Sort a slot's options by descending score, then shuffle within each tier of
    /// `tier_size` candidates.
    fn order_candidates(&mut self, slot_id: SlotId, options: &BitSet) -> Vec<WordId> {
        let slot_config = &self.slot_configs[slot_id];
        let lexicon = self.lexicon;
        let scorer = self.scorer;

        let mut candidates: Vec<WordId> = options.iter().collect();
        candidates.sort_by_cached_key(|&word_id| {
            Reverse(FloatOrd(scorer.score(lexicon.word(slot_config.length, word_id), slot_config)))
        });

        for tier in candidates.chunks_mut(self.config.tier_size.max(1)) {
            tier.shuffle(&mut self.rng);
        }

        candidates
    }

    fn commit(&mut self, slot_id: SlotId, word_id: WordId) {
        let slot_config = &self.slot_configs[slot_id];
        let word = self.lexicon.word(slot_config.length, word_id);

        for (&(row, col), &letter) in slot_config.cells.iter().zip(&word.letters) {
            self.letters[row][col] = Some(letter);
        }
        self.choices[slot_id] = Some(word_id);
        self.filled.insert(slot_id);
        self.used[slot_config.length].insert(word_id);

        let filled_count = self.filled.len();
        if filled_count > self.best.filled_count {
            self.best = Snapshot {
                letters: self.letters.clone(),
                choices: self.choices.clone(),
                filled_count,
            };
        }
    }

    fn retract(&mut self, slot_id: SlotId) {
        let length = self.slot_configs[slot_id].length;
        if let Some(word_id) = self.choices[slot_id].take() {
            self.used[length].remove(word_id);
        }
        self.filled.remove(slot_id);
        self.restore_slot_cells(slot_id);
    }

    /// Reset the cells of a slot that is no longer filled. A cell given by the template keeps
    /// its letter; a cell shared with a crossing slot that is still filled takes that slot's
    /// letter; every other cell is cleared. Must be called after the slot is removed from
    /// `filled`.
    fn restore_slot_cells(&mut self, slot_id: SlotId) {
        let slot_config = &self.slot_configs[slot_id];
        let lexicon = self.lexicon;

        for (cell_idx, &(row, col)) in slot_config.cells.iter().enumerate() {
            if self.pinned[row][col] {
                continue;
            }

            let crossing_letter = slot_config
                .crossing_at(cell_idx)
                .filter(|crossing| self.filled.contains(crossing.other_slot_id))
                .and_then(|crossing| {
                    let other_length = self.slot_configs[crossing.other_slot_id].length;
                    self.choices[crossing.other_slot_id].map(|word_id| {
                        lexicon.word(other_length, word_id).letters[crossing.other_slot_cell]
                    })
                });

            self.letters[row][col] = crossing_letter;
        }
    }

    fn search(&mut self) -> SearchOutcome {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return SearchOutcome::Aborted(FillError::Timeout);
            }
        }
        self.statistics.states += 1;

        let Some((slot_id, options)) = self.select_slot() else {
            return SearchOutcome::Solved;
        };
        if options.is_empty() {
            return SearchOutcome::Exhausted;
        }

        let length = self.slot_configs[slot_id].length;
        for word_id in self.order_candidates(slot_id, &options) {
            if self.used[length].contains(word_id) {
                continue;
            }

            self.commit(slot_id, word_id);
            match self.search() {
                SearchOutcome::Exhausted => {}
                outcome => return outcome,
            }
            self.retract(slot_id);

            self.statistics.backtracks += 1;
            if self.statistics.backtracks > self.config.max_backtracks {
                debug!(
                    "Giving up after {} backtracks ({} states)",
                    self.statistics.backtracks, self.statistics.states
                );
                return SearchOutcome::Aborted(FillError::BacktrackLimitExceeded {
                    limit: self.config.max_backtracks,
                });
            }
        }

        SearchOutcome::Exhausted
    }

    /// Turn a set of working letters and choices into a `Fill` over the template.
    fn build_fill(
        &self,
        template: &Grid,
        letters: &[Vec<Option<u8>>],
        choices: &[Option<WordId>],
    ) -> Fill {
        let mut grid = template.clone();
        for (row, row_letters) in letters.iter().enumerate() {
            for (col, &letter) in row_letters.iter().enumerate() {
                if !grid.is_block((row, col)) {
                    grid.set_cell((row, col), Cell::Letter(letter.map(char::from)));
                }
            }
        }

        let words = choices
            .iter()
            .enumerate()
            .filter_map(|(slot_id, choice)| {
                choice.map(|word_id| {
                    let length = self.slot_configs[slot_id].length;
                    (slot_id, self.lexicon.word(length, word_id).string.clone())
                })
            })
            .collect();

        let unfilled = choices
            .iter()
            .enumerate()
            .filter(|(_, choice)| choice.is_none())
            .map(|(slot_id, _)| slot_id)
            .collect();

        Fill {
            grid,
            words,
            unfilled,
            statistics: self.statistics.clone(),
        }
    }
}

/// Search for a fill of the given template using lexicon weights to order candidates.
pub fn find_fill(
    grid: &Grid,
    lexicon: &Lexicon,
    config: &FillConfig,
) -> Result<Fill, Box<FillFailure>> {
    find_fill_with_scorer(grid, lexicon, config, &WeightScorer)
}

/// Search for a fill of the given template, ordering candidates with `scorer`. Letters already
/// present in the template are kept. On failure, the deepest partial fill reached is returned
/// along with the error.
pub fn find_fill_with_scorer(
    grid: &Grid,
    lexicon: &Lexicon,
    config: &FillConfig,
    scorer: &dyn Scorer,
) -> Result<Fill, Box<FillFailure>> {
    let start = Instant::now();
    let slot_configs = discover_slots(grid);
    let mut search = Search::new(grid, lexicon, &slot_configs, scorer, config, start);

    let outcome = if slot_configs.is_empty() {
        SearchOutcome::Aborted(FillError::NoSlotsFound)
    } else {
        info!(
            "Filling {}x{} grid: {} slots, {} words, seed {}",
            grid.height(),
            grid.width(),
            slot_configs.len(),
            lexicon.len(),
            config.seed
        );
        search.search()
    };
    search.statistics.duration = start.elapsed();

    let error = match outcome {
        SearchOutcome::Solved => {
            info!(
                "Found fill: {} states, {} backtracks in {:?}",
                search.statistics.states, search.statistics.backtracks, search.statistics.duration
            );
            return Ok(search.build_fill(grid, &search.letters, &search.choices));
        }
        SearchOutcome::Exhausted => FillError::NoSolution,
        SearchOutcome::Aborted(error) => error,
    };

    info!(
        "Fill failed ({error}): {} of {} slots at best, {} backtracks",
        search.best.filled_count,
        slot_configs.len(),
        search.statistics.backtracks
    );
    let partial = search.build_fill(grid, &search.best.letters, &search.best.choices);
    Err(Box::new(FillFailure { error, partial }))
}
