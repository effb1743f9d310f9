//! Fixtures shared across integration tests.

#![allow(dead_code)]

use std::collections::HashSet;

use crossfill::{discover_slots, Fill, Grid, Lexicon, WordEntry};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Five by five with a block at the middle of each edge.
pub fn five_by_five() -> Grid {
    Grid::from_template_string(
        "
        ..#..
        .....
        #...#
        .....
        ..#..
        ",
    )
    .expect("valid template")
}

/// A small French theme set plus enough filler and distractor words for `five_by_five`.
pub fn fixture_entries() -> Vec<WordEntry> {
    let mut entries: Vec<WordEntry> = [("Chat", 9.0), ("Café", 9.0)]
        .into_iter()
        .chain([("riz", 8.0), ("eau", 8.0), ("feu", 8.0), ("Été", 8.0)])
        .map(|(word, weight)| WordEntry::new(word, weight).with_tag("theme"))
        .collect();

    let fillers = [
        ("ACTOR", 6.0),
        ("PARTY", 6.0),
        ("OCEAN", 6.0),
        ("SOUTH", 6.0),
        ("TAR", 5.0),
        ("BO", 3.0),
        ("SO", 3.0),
        ("AN", 3.0),
        ("HA", 3.0),
        ("BA", 3.0),
        ("PA", 3.0),
        ("OR", 3.0),
        ("YA", 3.0),
        ("NORTH", 5.0),
        ("EARTH", 5.0),
        ("OCTET", 4.0),
        ("TEA", 4.0),
        ("SEA", 4.0),
        ("TO", 2.0),
        ("AT", 2.0),
        ("NO", 2.0),
        ("ON", 2.0),
        ("OH", 2.0),
    ];
    entries.extend(fillers.map(|(word, weight)| WordEntry::new(word, weight)));

    entries
}

pub fn fixture_lexicon() -> Lexicon {
    Lexicon::from_entries(&fixture_entries())
}

/// Check that a complete fill is internally consistent: every slot spells its assigned word,
/// every word comes from the lexicon, and no word is used twice.
pub fn assert_valid_fill(template: &Grid, lexicon: &Lexicon, fill: &Fill) {
    let slots = discover_slots(template);
    assert!(fill.unfilled.is_empty());
    assert_eq!(fill.words.len(), slots.len());

    let mut seen = HashSet::new();
    for slot in &slots {
        let word = &fill.words[&slot.id];
        let spelled: String = slot
            .cells
            .iter()
            .map(|&loc| fill.grid.cell(loc).letter().expect("filled cell"))
            .collect();

        assert_eq!(&spelled, word, "{}", slot.label());
        assert!(lexicon.contains(word), "{word} is not in the lexicon");
        assert!(seen.insert(word.clone()), "{word} used twice");
    }
}
