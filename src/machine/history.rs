//! Bounded transition history for diagnostics.

use super::Transition;
use crate::constants::MAX_HISTORY_STATES;
use serde::Serialize;
use std::collections::VecDeque;

/// Append-only ring of the most recent transitions (oldest evicted first)
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct TransitionHistory {
    entries: VecDeque<Transition>,
}

impl TransitionHistory {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(MAX_HISTORY_STATES),
        }
    }

    pub(crate) fn push(&mut self, transition: Transition) {
        if self.entries.len() >= MAX_HISTORY_STATES {
            self.entries.pop_front();
        }
        self.entries.push_back(transition);
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&Transition> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.entries.iter()
    }

    pub fn to_vec(&self) -> Vec<Transition> {
        self.entries.iter().cloned().collect()
    }
}
