mod common;

use std::time::Duration;

use crossfill::{
    discover_slots, find_fill, find_fill_with_scorer, FillConfig, FillError, Grid,
    LetterScoreScorer, Lexicon, WordEntry,
};

use common::{assert_valid_fill, five_by_five, fixture_lexicon, init_logging};

#[test]
fn test_five_by_five_fixture() {
    init_logging();
    let grid = five_by_five();
    let lexicon = fixture_lexicon();
    assert!(lexicon.contains("ETE"));

    let fill = find_fill(&grid, &lexicon, &FillConfig::default()).expect("fixture should fill");

    assert_valid_fill(&grid, &lexicon, &fill);
    assert!(fill.statistics.backtracks < 50, "{:?}", fill.statistics);
    assert!(fill.grid.is_rotationally_symmetric());
}

#[test]
fn test_fixture_fills_for_many_seeds() {
    init_logging();
    let grid = five_by_five();
    let lexicon = fixture_lexicon();

    for seed in 0..25 {
        let config = FillConfig {
            seed,
            ..FillConfig::default()
        };
        let fill = find_fill(&grid, &lexicon, &config)
            .unwrap_or_else(|failure| panic!("seed {seed}: {failure}"));

        assert_valid_fill(&grid, &lexicon, &fill);
        assert!(fill.statistics.backtracks < 50, "seed {seed}");
    }
}

#[test]
fn test_same_seed_gives_same_fill() {
    init_logging();
    let grid = five_by_five();
    let config = FillConfig {
        seed: 42,
        ..FillConfig::default()
    };

    let first = find_fill(&grid, &fixture_lexicon(), &config).unwrap();
    for _ in 0..5 {
        // A freshly built lexicon with the same contents behaves identically.
        let again = find_fill(&grid, &fixture_lexicon(), &config).unwrap();
        assert_eq!(again.words, first.words);
        assert_eq!(again.grid, first.grid);
        assert_eq!(again.statistics.backtracks, first.statistics.backtracks);
        assert_eq!(again.statistics.states, first.statistics.states);
    }
}

#[test]
fn test_crossings_agree_in_filled_grid() {
    let grid = five_by_five();
    let fill = find_fill(&grid, &fixture_lexicon(), &FillConfig::default()).unwrap();
    let slots = discover_slots(&grid);

    for slot in &slots {
        for crossing in &slot.crossings {
            let other = &slots[crossing.other_slot_id];
            assert_eq!(slot.cells[crossing.cell_idx], other.cells[crossing.other_slot_cell]);

            let here = fill.words[&slot.id].as_bytes()[crossing.cell_idx];
            let there = fill.words[&other.id].as_bytes()[crossing.other_slot_cell];
            assert_eq!(here, there, "{} x {}", slot.label(), other.label());
        }
    }
}

#[test]
fn test_prefilled_letters_are_respected() {
    let grid = Grid::from_template_string(
        "
        ..#..
        .....
        #E..#
        .....
        ..#..
        ",
    )
    .unwrap();
    let lexicon = fixture_lexicon();

    let fill = find_fill(&grid, &lexicon, &FillConfig::default()).unwrap();

    assert_valid_fill(&grid, &lexicon, &fill);
    assert_eq!(fill.grid.cell((2, 1)).letter(), Some('E'));
}

#[test]
fn test_letter_scorer_also_fills() {
    let grid = five_by_five();
    let lexicon = fixture_lexicon();

    let fill = find_fill_with_scorer(
        &grid,
        &lexicon,
        &FillConfig::default(),
        &LetterScoreScorer::default(),
    )
    .unwrap();

    assert_valid_fill(&grid, &lexicon, &fill);
}

/// A 2x2 grid where every word fits the first slot but none completes the square.
fn dead_end() -> (Grid, Lexicon) {
    let grid = Grid::from_template_string("..\n..").unwrap();
    let lexicon = Lexicon::from_entries(&[WordEntry::new("AB", 1.0), WordEntry::new("CD", 1.0)]);
    (grid, lexicon)
}

#[test]
fn test_exhausted_search_reports_no_solution() {
    let (grid, lexicon) = dead_end();

    let failure = find_fill(&grid, &lexicon, &FillConfig::default()).unwrap_err();

    assert_eq!(failure.error, FillError::NoSolution);
    assert!(failure.error.is_retryable());
    assert_eq!(failure.partial.statistics.backtracks, 2);
    // The deepest partial fill had one word in place.
    assert_eq!(failure.partial.words.len(), 1);
    assert_eq!(failure.partial.unfilled.len(), 3);
}

#[test]
fn test_backtrack_ceiling_aborts_search() {
    let (grid, lexicon) = dead_end();
    let config = FillConfig {
        max_backtracks: 0,
        ..FillConfig::default()
    };

    let failure = find_fill(&grid, &lexicon, &config).unwrap_err();

    assert_eq!(failure.error, FillError::BacktrackLimitExceeded { limit: 0 });
    assert!(failure.error.is_retryable());
    assert_eq!(failure.partial.statistics.backtracks, 1);
}

#[test]
fn test_time_limit_aborts_search() {
    let config = FillConfig {
        time_limit: Some(Duration::ZERO),
        ..FillConfig::default()
    };

    let failure = find_fill(&five_by_five(), &fixture_lexicon(), &config).unwrap_err();

    assert_eq!(failure.error, FillError::Timeout);
    assert!(failure.partial.words.is_empty());
    assert_eq!(failure.partial.unfilled.len(), 14);
}
