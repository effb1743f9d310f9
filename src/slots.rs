use std::collections::HashMap;
use std::fmt;

use smallvec::SmallVec;

use crate::grid::Grid;
use crate::{GridCoord, SlotId, MAX_SLOT_LENGTH};

/// Direction that a slot is facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    Across,
    Down,
}

impl Direction {
    #[must_use]
    pub fn perpendicular(self) -> Direction {
        match self {
            Direction::Across => Direction::Down,
            Direction::Down => Direction::Across,
        }
    }

    /// The cell `offset` steps from `start` in this direction.
    #[must_use]
    pub fn step(self, (row, col): GridCoord, offset: usize) -> GridCoord {
        match self {
            Direction::Across => (row, col + offset),
            Direction::Down => (row + offset, col),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Across => write!(f, "across"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A struct representing a crossing between one slot and another, referencing the other slot's id
/// and the location of the intersection within both slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Crossing {
    pub other_slot_id: SlotId,
    pub cell_idx: usize,
    pub other_slot_cell: usize,
}

/// A struct representing the aspects of a slot in the grid that are static during filling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotConfig {
    pub id: SlotId,
    pub start_cell: GridCoord,
    pub direction: Direction,
    pub length: usize,
    pub cells: SmallVec<[GridCoord; MAX_SLOT_LENGTH]>,
    pub crossings: SmallVec<[Crossing; MAX_SLOT_LENGTH]>,
}

impl SlotConfig {
    /// The crossing at the given cell of this slot, if another slot shares it.
    #[must_use]
    pub fn crossing_at(&self, cell_idx: usize) -> Option<&Crossing> {
        self.crossings
            .iter()
            .find(|crossing| crossing.cell_idx == cell_idx)
    }

    /// A human-readable name for the slot, like `3-across`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}-{}", self.id, self.direction)
    }
}

/// Collect each maximal run of two or more letter cells in `lines`. Each line is a sequence of
/// (location, is_block) pairs.
fn collect_runs<L, I>(lines: L) -> Vec<SmallVec<[GridCoord; MAX_SLOT_LENGTH]>>
where
    L: IntoIterator<Item = I>,
    I: IntoIterator<Item = (GridCoord, bool)>,
{
    let mut result = vec![];

    for line in lines {
        let mut current: SmallVec<[GridCoord; MAX_SLOT_LENGTH]> = SmallVec::new();

        for (loc, is_block) in line {
            if is_block {
                if current.len() > 1 {
                    result.push(current);
                }
                current = SmallVec::new();
            } else {
                current.push(loc);
            }
        }

        if current.len() > 1 {
            result.push(current);
        }
    }

    result
}

/// Find every slot in the grid: across slots in row-major order followed by down slots in
/// column-major order, each with the crossings it shares with other slots.
#[must_use]
pub fn discover_slots(grid: &Grid) -> Vec<SlotConfig> {
    let across_runs = collect_runs((0..grid.height()).map(|row| {
        (0..grid.width()).map(move |col| ((row, col), grid.is_block((row, col))))
    }));
    let down_runs = collect_runs((0..grid.width()).map(|col| {
        (0..grid.height()).map(move |row| ((row, col), grid.is_block((row, col))))
    }));

    let mut slot_configs: Vec<SlotConfig> = across_runs
        .into_iter()
        .map(|cells| (Direction::Across, cells))
        .chain(down_runs.into_iter().map(|cells| (Direction::Down, cells)))
        .enumerate()
        .map(|(id, (direction, cells))| SlotConfig {
            id,
            start_cell: cells[0],
            direction,
            length: cells.len(),
            cells,
            crossings: SmallVec::new(),
        })
        .collect();

    // Build a map from cell location to the (slot id, cell index) pairs involved, which we can
    // then use to calculate crossings.
    let mut entries_by_loc: HashMap<GridCoord, SmallVec<[(SlotId, usize); 2]>> = HashMap::new();
    for slot_config in &slot_configs {
        for (cell_idx, &loc) in slot_config.cells.iter().enumerate() {
            entries_by_loc
                .entry(loc)
                .or_default()
                .push((slot_config.id, cell_idx));
        }
    }

    for slot_config in &mut slot_configs {
        let slot_id = slot_config.id;
        slot_config.crossings = slot_config
            .cells
            .iter()
            .enumerate()
            .filter_map(|(cell_idx, loc)| {
                let entries = &entries_by_loc[loc];
                if entries.len() != 2 {
                    return None;
                }
                entries
                    .iter()
                    .find(|&&(other_slot_id, _)| other_slot_id != slot_id)
                    .map(|&(other_slot_id, other_slot_cell)| Crossing {
                        other_slot_id,
                        cell_idx,
                        other_slot_cell,
                    })
            })
            .collect();
    }

    slot_configs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_by_five() -> Grid {
        Grid::from_template_string(
            "
            ..#..
            .....
            #...#
            .....
            ..#..
            ",
        )
        .unwrap()
    }

    #[test]
    fn test_discovers_across_then_down() {
        let slots = discover_slots(&five_by_five());

        let summary: Vec<_> = slots
            .iter()
            .map(|slot| (slot.direction, slot.start_cell, slot.length))
            .collect();

        assert_eq!(
            summary,
            vec![
                (Direction::Across, (0, 0), 2),
                (Direction::Across, (0, 3), 2),
                (Direction::Across, (1, 0), 5),
                (Direction::Across, (2, 1), 3),
                (Direction::Across, (3, 0), 5),
                (Direction::Across, (4, 0), 2),
                (Direction::Across, (4, 3), 2),
                (Direction::Down, (0, 0), 2),
                (Direction::Down, (3, 0), 2),
                (Direction::Down, (0, 1), 5),
                (Direction::Down, (1, 2), 3),
                (Direction::Down, (0, 3), 5),
                (Direction::Down, (0, 4), 2),
                (Direction::Down, (3, 4), 2),
            ]
        );
        assert!(slots.iter().enumerate().all(|(idx, slot)| slot.id == idx));
        assert_eq!(slots[3].label(), "3-across");
    }

    #[test]
    fn test_crossings_are_consistent() {
        let slots = discover_slots(&five_by_five());

        for slot in &slots {
            for crossing in &slot.crossings {
                let other = &slots[crossing.other_slot_id];
                assert_eq!(slot.cells[crossing.cell_idx], other.cells[crossing.other_slot_cell]);
                assert_ne!(slot.direction, other.direction);

                let back = other
                    .crossing_at(crossing.other_slot_cell)
                    .expect("crossing recorded on both sides");
                assert_eq!(back.other_slot_id, slot.id);
                assert_eq!(back.other_slot_cell, crossing.cell_idx);
            }
        }

        // Every letter cell of this template is checked, so each slot crosses at every cell.
        assert!(slots.iter().all(|slot| slot.crossings.len() == slot.length));
    }

    #[test]
    fn test_single_cells_are_not_slots() {
        let grid = Grid::from_template_string(
            "
            .#.
            ##.
            ...
            ",
        )
        .unwrap();
        let slots = discover_slots(&grid);

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0].direction, Direction::Across);
        assert_eq!(slots[0].cells.as_slice(), &[(2, 0), (2, 1), (2, 2)]);
        assert_eq!(slots[1].direction, Direction::Down);
        assert_eq!(slots[1].cells.as_slice(), &[(0, 2), (1, 2), (2, 2)]);

        assert_eq!(
            slots[0].crossings.as_slice(),
            &[Crossing { other_slot_id: 1, cell_idx: 2, other_slot_cell: 2 }]
        );
        assert!(slots[0].crossing_at(0).is_none());
    }

    #[test]
    fn test_all_block_grid_has_no_slots() {
        let grid = Grid::from_template_string("##\n##").unwrap();
        assert!(discover_slots(&grid).is_empty());
    }
}
