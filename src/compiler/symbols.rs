//! Debug side table from compiled states back to the pattern.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::automaton::StateId;

/// Which unit a state starts or ends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolDetails {
    pub unit: String,
    pub is_end: bool,
}

impl fmt::Display for SymbolDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = if self.is_end { "end" } else { "start" };
        write!(f, "{} {}", side, self.unit)
    }
}

/// Per-state symbol details. Only ever read for descriptions.
#[derive(Clone, Debug, Default)]
pub struct Symbols {
    details: FxHashMap<StateId, SymbolDetails>,
}

impl Symbols {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep the first details recorded for a state; the innermost unit is
    /// compiled first, so it wins.
    pub fn insert_if_absent(&mut self, id: StateId, details: SymbolDetails) {
        self.details.entry(id).or_insert(details);
    }

    pub fn get(&self, id: StateId) -> Option<&SymbolDetails> {
        self.details.get(&id)
    }

    pub fn len(&self) -> usize {
        self.details.len()
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }

    /// Rewrite ids through `mapping` (old index -> new id), dropping states
    /// that did not survive.
    pub(crate) fn renumbered(self, mapping: &[StateId]) -> Symbols {
        let details = self
            .details
            .into_iter()
            .filter_map(|(old, details)| {
                let new = *mapping.get(old.index())?;
                (!new.is_none()).then_some((new, details))
            })
            .collect();
        Symbols { details }
    }
}
