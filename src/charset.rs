//! Character sets as sorted lists of inclusive char ranges.
//!
//! A [`CharacterSet`] is always kept normalized: ranges are sorted by their
//! lower bound, never overlap and never touch. That makes membership a
//! binary search and lets union and inversion work range-by-range instead
//! of char-by-char.

use std::fmt;

/// A pair of chars representing an inclusive range [lo, hi].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunePair {
    pub lo: char,
    pub hi: char,
}

impl RunePair {
    #[inline]
    pub fn new(lo: char, hi: char) -> Self {
        Self { lo, hi }
    }

    #[inline]
    pub fn single(c: char) -> Self {
        Self { lo: c, hi: c }
    }
}

/// Surrogate code points can never be a `char`, so inverted sets skip them.
const SURROGATE_START_CP: u32 = 0xD800;
const SURROGATE_END_CP: u32 = 0xDFFF;

/// A set of chars, stored as normalized ranges.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct CharacterSet {
    ranges: Vec<RunePair>,
}

impl CharacterSet {
    /// The set containing nothing.
    pub fn empty() -> Self {
        Self { ranges: Vec::new() }
    }

    pub fn from_char(c: char) -> Self {
        Self {
            ranges: vec![RunePair::single(c)],
        }
    }

    /// The inclusive range `lo..=hi`. An inverted range yields the empty set.
    pub fn from_range(lo: char, hi: char) -> Self {
        if lo > hi {
            return Self::empty();
        }
        Self {
            ranges: vec![RunePair::new(lo, hi)],
        }
    }

    /// Build a set from arbitrary (unsorted, overlapping) ranges.
    pub fn from_ranges(ranges: impl IntoIterator<Item = RunePair>) -> Self {
        Self {
            ranges: simplify(ranges.into_iter().filter(|rp| rp.lo <= rp.hi).collect()),
        }
    }

    /// Every char in `allowed`.
    pub fn chars_in(allowed: &str) -> Self {
        Self::from_ranges(allowed.chars().map(RunePair::single))
    }

    pub fn ranges(&self) -> &[RunePair] {
        &self.ranges
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    #[inline]
    pub fn contains(&self, c: char) -> bool {
        self.ranges
            .binary_search_by(|rp| {
                if rp.hi < c {
                    std::cmp::Ordering::Less
                } else if rp.lo > c {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// Membership ignoring case: `c`, its lowercase and its uppercase forms
    /// are all tried.
    pub fn contains_ignore_case(&self, c: char) -> bool {
        self.contains(c)
            || single_lowercase(c).is_some_and(|l| self.contains(l))
            || single_uppercase(c).is_some_and(|u| self.contains(u))
    }

    pub fn union(&self, other: &CharacterSet) -> CharacterSet {
        let mut ranges = Vec::with_capacity(self.ranges.len() + other.ranges.len());
        ranges.extend_from_slice(&self.ranges);
        ranges.extend_from_slice(&other.ranges);
        Self {
            ranges: simplify(ranges),
        }
    }

    /// Every valid `char` not in this set.
    pub fn inverted(&self) -> CharacterSet {
        let mut inverted = Vec::with_capacity(self.ranges.len() + 2);
        let mut point: u32 = 0;
        for pair in &self.ranges {
            let lo = pair.lo as u32;
            if lo > point {
                add_gap_range(&mut inverted, point, lo - 1);
            }
            point = pair.hi as u32 + 1;
        }
        if point <= char::MAX as u32 {
            add_gap_range(&mut inverted, point, char::MAX as u32);
        }
        Self { ranges: inverted }
    }
}

impl fmt::Debug for CharacterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, rp) in self.ranges.iter().enumerate() {
            if i == 8 {
                write!(f, "…+{}", self.ranges.len() - i)?;
                break;
            }
            if rp.lo == rp.hi {
                write!(f, "{:?}", rp.lo)?;
            } else {
                write!(f, "{:?}-{:?}", rp.lo, rp.hi)?;
            }
        }
        write!(f, "]")
    }
}

/// Sort and merge overlapping or adjacent ranges.
fn simplify(mut ranges: Vec<RunePair>) -> Vec<RunePair> {
    if ranges.is_empty() {
        return ranges;
    }
    ranges.sort_by_key(|rp| rp.lo);

    let mut out = Vec::with_capacity(ranges.len());
    let mut current = ranges[0];
    for next in ranges.iter().skip(1).copied() {
        if next.lo as u32 > current.hi as u32 + 1 {
            out.push(current);
            current = next;
            continue;
        }
        if next.hi > current.hi {
            current.hi = next.hi;
        }
    }
    out.push(current);
    out
}

/// Push `start..=end` (code points) onto `out`, cutting out the surrogates.
fn add_gap_range(out: &mut Vec<RunePair>, start: u32, end: u32) {
    let mut push = |lo: u32, hi: u32| {
        if lo > hi {
            return;
        }
        if let (Some(lo), Some(hi)) = (char::from_u32(lo), char::from_u32(hi)) {
            out.push(RunePair { lo, hi });
        }
    };

    if end < SURROGATE_START_CP || start > SURROGATE_END_CP {
        push(start, end);
    } else {
        if start < SURROGATE_START_CP {
            push(start, SURROGATE_START_CP - 1);
        }
        if end > SURROGATE_END_CP {
            push(SURROGATE_END_CP + 1, end);
        }
    }
}

/// Lowercase mapping when it is a single char.
#[inline]
fn single_lowercase(c: char) -> Option<char> {
    let mut it = c.to_lowercase();
    match (it.next(), it.next()) {
        (Some(l), None) => Some(l),
        _ => None,
    }
}

/// Uppercase mapping when it is a single char.
#[inline]
fn single_uppercase(c: char) -> Option<char> {
    let mut it = c.to_uppercase();
    match (it.next(), it.next()) {
        (Some(u), None) => Some(u),
        _ => None,
    }
}

/// Compare two chars, ignoring case.
#[inline]
pub fn eq_ignore_case(a: char, b: char) -> bool {
    if a == b {
        return true;
    }
    match (single_lowercase(a), single_lowercase(b)) {
        (Some(la), Some(lb)) if la == lb => true,
        _ => matches!(
            (single_uppercase(a), single_uppercase(b)),
            (Some(ua), Some(ub)) if ua == ub
        ),
    }
}
