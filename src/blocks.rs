//! Sanity checks for block layouts, plus a routine for adding blocks to an open template.

use log::debug;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::BlockLimits;
use crate::grid::{Cell, Grid};
use crate::GridCoord;

/// Grids up to this size in both dimensions use the direct corner-expansion cluster search;
/// anything bigger uses the histogram sweep.
const CLUSTER_SCAN_LIMIT: usize = 16;

/// Block layout statistics for a grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockAnalysis {
    /// The longest run of consecutive blocks in each row.
    pub row_runs: Vec<usize>,

    /// The longest run of consecutive blocks in each column.
    pub col_runs: Vec<usize>,

    pub max_row_run: usize,
    pub max_col_run: usize,

    /// Area of the largest solid rectangle of blocks.
    pub largest_cluster: usize,

    /// Top-left and bottom-right corners (inclusive) of that rectangle, if there are any blocks.
    pub cluster_bounds: Option<(GridCoord, GridCoord)>,
}

impl BlockAnalysis {
    /// The longest run of blocks in either direction.
    #[must_use]
    pub fn max_consecutive(&self) -> usize {
        self.max_row_run.max(self.max_col_run)
    }
}

fn longest_run(blocks: impl Iterator<Item = bool>) -> usize {
    let (mut longest, mut current) = (0, 0);
    for is_block in blocks {
        current = if is_block { current + 1 } else { 0 };
        longest = longest.max(current);
    }
    longest
}

type Cluster = (usize, (GridCoord, GridCoord));

/// Try every block as a top-left corner and grow downward, tracking the narrowest row run seen.
fn largest_cluster_by_expansion(grid: &Grid) -> Option<Cluster> {
    let (height, width) = (grid.height(), grid.width());
    let mut best: Option<Cluster> = None;

    for top in 0..height {
        for left in 0..width {
            let mut cluster_width = usize::MAX;

            for bottom in top..height {
                let run = (left..width)
                    .take_while(|&col| grid.is_block((bottom, col)))
                    .count();
                cluster_width = cluster_width.min(run);
                if cluster_width == 0 {
                    break;
                }

                let area = (bottom - top + 1) * cluster_width;
                if best.map_or(true, |(best_area, _)| area > best_area) {
                    best = Some((area, ((top, left), (bottom, left + cluster_width - 1))));
                }
            }
        }
    }

    best
}

/// Maximal-rectangle sweep: each row turns the grid into a histogram of block column heights
/// ending at that row, and a monotonic stack finds the largest rectangle under it.
fn largest_cluster_by_sweep(grid: &Grid) -> Option<Cluster> {
    let (height, width) = (grid.height(), grid.width());
    let mut heights = vec![0; width];
    let mut best: Option<Cluster> = None;

    for row in 0..height {
        for (col, column_height) in heights.iter_mut().enumerate() {
            *column_height = if grid.is_block((row, col)) { *column_height + 1 } else { 0 };
        }

        let mut stack: Vec<usize> = vec![];
        for col in 0..=width {
            let current = heights.get(col).copied().unwrap_or(0);

            while let Some(&top) = stack.last() {
                if heights[top] < current {
                    break;
                }
                stack.pop();

                let bar = heights[top];
                let left = stack.last().map_or(0, |&prev| prev + 1);
                let area = bar * (col - left);
                if area > 0 && best.map_or(true, |(best_area, _)| area > best_area) {
                    best = Some((area, ((row + 1 - bar, left), (row, col - 1))));
                }
            }

            stack.push(col);
        }
    }

    best
}

/// Measure the block runs in every row and column and find the largest solid block rectangle.
#[must_use]
pub fn analyze_dead_blocks(grid: &Grid) -> BlockAnalysis {
    let row_runs: Vec<usize> = (0..grid.height())
        .map(|row| longest_run((0..grid.width()).map(|col| grid.is_block((row, col)))))
        .collect();
    let col_runs: Vec<usize> = (0..grid.width())
        .map(|col| longest_run((0..grid.height()).map(|row| grid.is_block((row, col)))))
        .collect();

    let cluster = if grid.height() <= CLUSTER_SCAN_LIMIT && grid.width() <= CLUSTER_SCAN_LIMIT {
        largest_cluster_by_expansion(grid)
    } else {
        largest_cluster_by_sweep(grid)
    };

    BlockAnalysis {
        max_row_run: row_runs.iter().copied().max().unwrap_or(0),
        max_col_run: col_runs.iter().copied().max().unwrap_or(0),
        row_runs,
        col_runs,
        largest_cluster: cluster.map_or(0, |(area, _)| area),
        cluster_bounds: cluster.map(|(_, bounds)| bounds),
    }
}

/// Describe every way the grid's blocks exceed the given thresholds. A threshold of 0 is
/// unlimited. An empty result means the pattern is acceptable.
#[must_use]
pub fn validate_block_pattern(
    grid: &Grid,
    max_consecutive: usize,
    max_cluster_area: usize,
) -> Vec<String> {
    let analysis = analyze_dead_blocks(grid);
    let mut violations = vec![];

    if max_consecutive > 0 {
        for (row, &run) in analysis.row_runs.iter().enumerate() {
            if run > max_consecutive {
                violations.push(format!(
                    "row {row} has {run} consecutive blocks (max {max_consecutive})"
                ));
            }
        }
        for (col, &run) in analysis.col_runs.iter().enumerate() {
            if run > max_consecutive {
                violations.push(format!(
                    "column {col} has {run} consecutive blocks (max {max_consecutive})"
                ));
            }
        }
    }

    if max_cluster_area > 0 && analysis.largest_cluster > max_cluster_area {
        if let Some(((top, left), (bottom, right))) = analysis.cluster_bounds {
            violations.push(format!(
                "block cluster of area {} from ({top}, {left}) to ({bottom}, {right}) exceeds {}",
                analysis.largest_cluster, max_cluster_area
            ));
        }
    }

    violations
}

fn neighbors(grid: &Grid, (row, col): GridCoord) -> impl Iterator<Item = GridCoord> {
    let (height, width) = (grid.height(), grid.width());
    [
        row.checked_sub(1).map(|r| (r, col)),
        (row + 1 < height).then_some((row + 1, col)),
        col.checked_sub(1).map(|c| (row, c)),
        (col + 1 < width).then_some((row, col + 1)),
    ]
    .into_iter()
    .flatten()
}

/// Does this letter cell still belong to a run of at least two letters in some direction?
fn in_some_slot(grid: &Grid, (row, col): GridCoord) -> bool {
    let is_letter = |loc: GridCoord| !grid.is_block(loc);

    let across = (col > 0 && is_letter((row, col - 1)))
        || (col + 1 < grid.width() && is_letter((row, col + 1)));
    let down = (row > 0 && is_letter((row - 1, col)))
        || (row + 1 < grid.height() && is_letter((row + 1, col)));

    across || down
}

/// Add blocks to `grid` in 180-degree-symmetric pairs until it has at least `target_blocks`
/// blocks or no further pair qualifies. Only empty letter cells are blocked. A pair is accepted
/// when neither cell touches another block orthogonally, every neighboring letter cell still
/// belongs to some slot, and the grid stays within `limits`. A pair can overshoot the target by
/// one block. The order in which cells are tried is a seeded shuffle, so the same seed always
/// gives the same grid.
///
/// A grid that already violates `limits` is returned unchanged.
#[must_use]
pub fn place_symmetric_blocks(
    grid: &Grid,
    target_blocks: usize,
    limits: &BlockLimits,
    seed: u64,
) -> Grid {
    let mut result = grid.clone();

    let existing = validate_block_pattern(&result, limits.max_consecutive, limits.max_cluster_area);
    if !existing.is_empty() {
        debug!("Not placing blocks in a grid that is already invalid: {existing:?}");
        return result;
    }

    let mut candidates: Vec<GridCoord> = result
        .cells()
        .filter(|&(loc, cell)| cell == Cell::Letter(None) && loc <= result.mirror(loc))
        .map(|(loc, _)| loc)
        .collect();
    let mut rng = SmallRng::seed_from_u64(seed);
    candidates.shuffle(&mut rng);

    for loc in candidates {
        if result.block_count() >= target_blocks {
            break;
        }

        let mirror = result.mirror(loc);
        if result.cell(mirror) != Cell::Letter(None)
            || neighbors(&result, loc).any(|n| n == mirror || result.is_block(n))
            || neighbors(&result, mirror).any(|n| result.is_block(n))
        {
            continue;
        }

        let mut attempt = result.clone();
        attempt.set_cell(loc, Cell::Block);
        attempt.set_cell(mirror, Cell::Block);

        let orphaned = [loc, mirror]
            .into_iter()
            .flat_map(|blocked| neighbors(&attempt, blocked))
            .any(|n| !attempt.is_block(n) && !in_some_slot(&attempt, n));
        if orphaned {
            continue;
        }

        if !validate_block_pattern(&attempt, limits.max_consecutive, limits.max_cluster_area)
            .is_empty()
        {
            continue;
        }

        debug!("Placed symmetric blocks at {loc:?} and {mirror:?}");
        result = attempt;
    }

    result
}
