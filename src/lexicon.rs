use std::collections::{BTreeSet, HashMap};

use bit_set::BitSet;
use log::warn;
use smallvec::SmallVec;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::errors::LexiconError;
use crate::{WordId, MAX_SLOT_LENGTH};

const ALPHABET_SIZE: usize = 26;

/// A candidate word as supplied by the caller, before it's merged into a `Lexicon`.
#[derive(Debug, Clone, PartialEq)]
pub struct WordEntry {
    pub word: String,
    pub weight: f32,
    pub tags: BTreeSet<String>,
}

impl WordEntry {
    pub fn new(word: impl Into<String>, weight: f32) -> WordEntry {
        WordEntry {
            word: word.into(),
            weight,
            tags: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> WordEntry {
        self.tags.insert(tag.into());
        self
    }
}

/// What happened to the entries of a candidate list passed to `Lexicon::merge_candidates`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,

    /// Entries whose normalized form was already present.
    pub duplicates: usize,

    /// Entries that don't normalize to a valid word.
    pub rejected: usize,
}

/// A struct representing a word stored in the lexicon.
#[derive(Debug, Clone)]
pub struct Word {
    /// The normalized word: uppercase ASCII letters only.
    pub string: String,

    /// The bytes of `string`, kept inline for fast per-cell comparisons.
    pub letters: SmallVec<[u8; MAX_SLOT_LENGTH]>,

    /// Frequency or relevance weight; higher is better.
    pub weight: f32,

    pub tags: BTreeSet<String>,
}

impl Word {
    #[must_use]
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}

/// Given a word from a candidate list, turn it into the form we use in the grid: uppercase
/// letters with accents, whitespace and word punctuation removed, and the `Œ`/`Æ` ligatures
/// spelled out.
#[must_use]
pub fn normalize_word(raw: &str) -> String {
    // NFD leaves ligatures alone.
    let mut expanded = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            'Œ' | 'œ' => expanded.push_str("OE"),
            'Æ' | 'æ' => expanded.push_str("AE"),
            c => expanded.push(c),
        }
    }

    expanded
        .nfd() // Split accented letters into base letter + combining mark
        .filter(|&c| {
            !is_combining_mark(c) && !c.is_whitespace() && !matches!(c, '-' | '\'' | '’' | '.')
        })
        .flat_map(char::to_uppercase)
        .collect()
}

/// A set of weighted words, bucketed by length and indexed by (position, letter) so that
/// wildcard patterns can be matched by intersecting bitsets.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    /// Words bucketed by length; a word's `WordId` is its index within its bucket.
    words: Vec<Vec<Word>>,

    /// For each length, position and letter, the set of word ids with that letter there.
    letter_index: Vec<Vec<[BitSet; ALPHABET_SIZE]>>,

    word_id_by_string: HashMap<String, (usize, WordId)>,

    /// Every word's (length, id) in the order it was added.
    insertion_order: Vec<(usize, WordId)>,
}

impl Lexicon {
    #[must_use]
    pub fn new() -> Lexicon {
        Lexicon::default()
    }

    /// Build a lexicon from a candidate list, skipping (and logging) invalid entries.
    #[must_use]
    pub fn from_entries(entries: &[WordEntry]) -> Lexicon {
        let mut lexicon = Lexicon::new();
        lexicon.merge_candidates(entries);
        lexicon
    }

    /// Add a word to the lexicon. Returns `Ok(false)` without changing anything if the word (after
    /// normalization) is already present.
    pub fn add<I, S>(&mut self, word: &str, weight: f32, tags: I) -> Result<bool, LexiconError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let string = normalize_word(word);
        if string.is_empty() || !string.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(LexiconError::InvalidWord(word.to_string()));
        }
        if self.word_id_by_string.contains_key(&string) {
            return Ok(false);
        }

        let length = string.len();
        if self.words.len() <= length {
            self.words.resize_with(length + 1, Vec::new);
            self.letter_index.resize_with(length + 1, Vec::new);
        }
        if self.letter_index[length].is_empty() {
            self.letter_index[length] = (0..length)
                .map(|_| std::array::from_fn(|_| BitSet::new()))
                .collect();
        }

        let word_id = self.words[length].len();
        for (cell_idx, letter) in string.bytes().enumerate() {
            self.letter_index[length][cell_idx][(letter - b'A') as usize].insert(word_id);
        }

        self.words[length].push(Word {
            letters: string.bytes().collect(),
            string: string.clone(),
            weight,
            tags: tags.into_iter().map(Into::into).collect(),
        });
        self.word_id_by_string.insert(string, (length, word_id));
        self.insertion_order.push((length, word_id));

        Ok(true)
    }

    /// Merge an external candidate list into the lexicon. Duplicates are ignored and invalid
    /// entries are logged and skipped; both are counted in the returned stats.
    pub fn merge_candidates(&mut self, entries: &[WordEntry]) -> MergeStats {
        let mut stats = MergeStats::default();
        for entry in entries {
            match self.add(&entry.word, entry.weight, entry.tags.iter().cloned()) {
                Ok(true) => stats.added += 1,
                Ok(false) => stats.duplicates += 1,
                Err(err) => {
                    warn!("Skipping candidate: {err}");
                    stats.rejected += 1;
                }
            }
        }
        stats
    }

    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.word_id_by_string.contains_key(&normalize_word(word))
    }

    /// The total number of words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.insertion_order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.insertion_order.is_empty()
    }

    #[must_use]
    pub fn get(&self, word: &str) -> Option<&Word> {
        self.word_id_by_string
            .get(&normalize_word(word))
            .map(|&(length, word_id)| &self.words[length][word_id])
    }

    /// Look up a word by its length and id.
    #[must_use]
    pub fn word(&self, length: usize, word_id: WordId) -> &Word {
        &self.words[length][word_id]
    }

    /// All words of the given length, in insertion order.
    #[must_use]
    pub fn words_of_length(&self, length: usize) -> &[Word] {
        self.words.get(length).map(Vec::as_slice).unwrap_or_default()
    }

    /// Iterate over every word in the order it was added.
    pub fn iter(&self) -> impl Iterator<Item = &Word> + '_ {
        self.insertion_order
            .iter()
            .map(|&(length, word_id)| &self.words[length][word_id])
    }

    /// Find every word matching `pattern`, where `.` matches any letter and any other character
    /// must match exactly (case-insensitively). Results are in insertion order.
    ///
    /// Slots are never shorter than two cells, so an empty pattern has no meaning here; it
    /// matches nothing.
    #[must_use]
    pub fn match_pattern(&self, pattern: &str) -> Vec<&Word> {
        let Some(pattern) = parse_pattern(pattern) else {
            return vec![];
        };
        let length = pattern.len();
        self.matching_set(&pattern)
            .iter()
            .map(|word_id| &self.words[length][word_id])
            .collect()
    }

    /// The ids of all words of `pattern.len()` letters agreeing with every fixed letter in
    /// `pattern`, as a set over that length's bucket.
    pub(crate) fn matching_set(&self, pattern: &[Option<u8>]) -> BitSet {
        let length = pattern.len();
        let bucket_size = self.words_of_length(length).len();
        if length == 0 || bucket_size == 0 {
            return BitSet::new();
        }

        let mut fixed = pattern
            .iter()
            .enumerate()
            .filter_map(|(cell_idx, letter)| letter.map(|letter| (cell_idx, letter)));

        let Some((cell_idx, letter)) = fixed.next() else {
            return BitSet::from_iter(0..bucket_size);
        };
        let Some(first) = self.position_set(length, cell_idx, letter) else {
            return BitSet::new();
        };

        let mut result = first.clone();
        for (cell_idx, letter) in fixed {
            match self.position_set(length, cell_idx, letter) {
                Some(set) => result.intersect_with(set),
                None => return BitSet::new(),
            }
            if result.is_empty() {
                break;
            }
        }
        result
    }

    fn position_set(&self, length: usize, cell_idx: usize, letter: u8) -> Option<&BitSet> {
        if !letter.is_ascii_uppercase() {
            return None;
        }
        self.letter_index
            .get(length)?
            .get(cell_idx)
            .map(|sets| &sets[(letter - b'A') as usize])
    }
}

/// Turn a textual pattern into per-cell constraints, or `None` if it contains a character that
/// can't appear in any word.
fn parse_pattern(pattern: &str) -> Option<SmallVec<[Option<u8>; MAX_SLOT_LENGTH]>> {
    pattern
        .chars()
        .map(|ch| match ch {
            '.' => Some(None),
            ch if ch.is_ascii_alphabetic() => Some(Some(ch.to_ascii_uppercase() as u8)),
            _ => None,
        })
        .collect()
}
