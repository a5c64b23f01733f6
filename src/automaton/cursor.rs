//! The traversal position over the input.
//!
//! All indices are byte offsets into the input and always sit on char
//! boundaries. Capture groups are kept in a flat slot vector: group `g`
//! owns slots `2g` (start) and `2g + 1` (end). Slot pair 0 belongs to the
//! whole match and is filled in by match assembly, not during traversal.

use std::ops::Range;

use crate::charset::CharacterSet;

/// The input plus where a match attempt currently stands.
#[derive(Debug, Clone)]
pub struct Cursor<'h> {
    input: &'h str,
    /// Current position.
    index: usize,
    /// End of the previous match, for `\G`.
    previous_match_end: Option<usize>,
    slots: Vec<Option<usize>>,
}

impl<'h> Cursor<'h> {
    /// A cursor at `start` with room for groups `1..=group_count`.
    pub fn new(input: &'h str, start: usize, group_count: usize) -> Self {
        Self {
            input,
            index: start,
            previous_match_end: None,
            slots: vec![None; 2 * (group_count + 1)],
        }
    }

    /// Begin a fresh attempt at `start`, forgetting every capture.
    pub fn reset(&mut self, start: usize) {
        self.index = start;
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    #[inline]
    pub fn input(&self) -> &'h str {
        self.input
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn set_index(&mut self, index: usize) {
        debug_assert!(self.input.is_char_boundary(index));
        self.index = index;
    }

    pub fn previous_match_end(&self) -> Option<usize> {
        self.previous_match_end
    }

    pub fn set_previous_match_end(&mut self, end: Option<usize>) {
        self.previous_match_end = end;
    }

    /// The char at the current index, `None` at the end of input.
    #[inline]
    pub fn character(&self) -> Option<char> {
        self.input[self.index..].chars().next()
    }

    /// The char just before the current index.
    #[inline]
    pub fn previous_character(&self) -> Option<char> {
        self.input[..self.index].chars().next_back()
    }

    /// The input from the current index on.
    #[inline]
    pub fn rest(&self) -> &'h str {
        &self.input[self.index..]
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.index >= self.input.len()
    }

    /// The current char is the last one in the input.
    pub fn is_at_last_character(&self) -> bool {
        self.character()
            .is_some_and(|c| self.index + c.len_utf8() == self.input.len())
    }

    /// Word-ness differs on the two sides of the current index.
    pub fn is_at_word_boundary(&self, word: &CharacterSet) -> bool {
        let before = self.previous_character().is_some_and(|c| word.contains(c));
        let after = self.character().is_some_and(|c| word.contains(c));
        before != after
    }

    pub fn slots(&self) -> &[Option<usize>] {
        &self.slots
    }

    #[inline]
    pub fn slot(&self, slot: usize) -> Option<usize> {
        self.slots.get(slot).copied().flatten()
    }

    /// Overwrite a slot, returning what was there so it can be restored.
    #[inline]
    pub fn replace_slot(&mut self, slot: usize, value: Option<usize>) -> Option<usize> {
        std::mem::replace(&mut self.slots[slot], value)
    }

    /// The range captured so far for `group`, if both ends are set.
    pub fn group(&self, group: usize) -> Option<Range<usize>> {
        match (self.slot(2 * group), self.slot(2 * group + 1)) {
            (Some(start), Some(end)) if start <= end => Some(start..end),
            _ => None,
        }
    }
}
