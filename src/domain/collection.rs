//! The bottle collection and its views
//!
//! The display order groups bottles into three buckets (ready and unopened,
//! still sealed, opened), each ordered by unlock date. Indices shown to the
//! user are 1-based positions in that full order, so filtering hides rows
//! without renumbering them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::bottle::{Bottle, BottleState};
use super::date::BottleDate;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown bottle type '{0}' (expected one of: all, opened, unopened, ready, unready, new)")]
pub struct FilterKindError(String);

/// Which bottles a view includes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    All,
    Opened,
    Unopened,
    /// Unlock date has arrived, opened or not
    #[default]
    Ready,
    Unready,
    /// Ready and not yet opened
    New,
}

impl FilterKind {
    pub const ALL: [FilterKind; 6] = [
        FilterKind::All,
        FilterKind::Opened,
        FilterKind::Unopened,
        FilterKind::Ready,
        FilterKind::Unready,
        FilterKind::New,
    ];

    pub fn matches(&self, bottle: &Bottle, today: BottleDate) -> bool {
        match self {
            FilterKind::All => true,
            FilterKind::Opened => bottle.is_opened(),
            FilterKind::Unopened => !bottle.is_opened(),
            FilterKind::Ready => bottle.is_ready(today),
            FilterKind::Unready => !bottle.is_ready(today),
            FilterKind::New => bottle.is_new(today),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::All => "all",
            FilterKind::Opened => "opened",
            FilterKind::Unopened => "unopened",
            FilterKind::Ready => "ready",
            FilterKind::Unready => "unready",
            FilterKind::New => "new",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = FilterKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| FilterKindError(s.to_string()))
    }
}

/// A bottle together with its 1-based position in the sorted collection
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    pub index: usize,
    pub bottle: &'a Bottle,
}

/// All bottles, in storage order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    bottles: Vec<Bottle>,
}

impl Collection {
    pub fn new(bottles: Vec<Bottle>) -> Self {
        Self { bottles }
    }

    pub fn len(&self) -> usize {
        self.bottles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bottles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bottle> {
        self.bottles.iter()
    }

    pub fn push(&mut self, bottle: Bottle) {
        self.bottles.push(bottle);
    }

    /// Bottle at a 1-based index
    pub fn get(&self, index: usize) -> Option<&Bottle> {
        index.checked_sub(1).and_then(|i| self.bottles.get(i))
    }

    /// Mutable bottle at a 1-based index
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Bottle> {
        index.checked_sub(1).and_then(|i| self.bottles.get_mut(i))
    }

    /// Removes and returns the bottle at a 1-based index
    pub fn remove(&mut self, index: usize) -> Option<Bottle> {
        if index == 0 || index > self.bottles.len() {
            return None;
        }
        Some(self.bottles.remove(index - 1))
    }

    /// Puts the bottles into display order
    ///
    /// Stable, so bottles sharing a bucket and unlock date keep their
    /// relative order.
    pub fn sort(&mut self, today: BottleDate) {
        self.bottles
            .sort_by_key(|bottle| (bucket(bottle.state(today)), bottle.unlock_date));
    }

    /// Returns the collection in display order
    pub fn sorted(mut self, today: BottleDate) -> Self {
        self.sort(today);
        self
    }

    /// Bottles matching `kind`, each with its index in the full collection
    ///
    /// Call [`Collection::sort`] first for display order.
    pub fn filter(&self, kind: FilterKind, today: BottleDate) -> Vec<Entry<'_>> {
        self.bottles
            .iter()
            .enumerate()
            .filter(|(_, bottle)| kind.matches(bottle, today))
            .map(|(i, bottle)| Entry {
                index: i + 1,
                bottle,
            })
            .collect()
    }

    pub fn count(&self, kind: FilterKind, today: BottleDate) -> usize {
        self.bottles
            .iter()
            .filter(|bottle| kind.matches(bottle, today))
            .count()
    }
}

fn bucket(state: BottleState) -> u8 {
    match state {
        BottleState::SealedReady => 0,
        BottleState::SealedNotReady => 1,
        BottleState::Opened => 2,
    }
}

impl FromIterator<Bottle> for Collection {
    fn from_iter<I: IntoIterator<Item = Bottle>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Bottle;
    type IntoIter = std::slice::Iter<'a, Bottle>;

    fn into_iter(self) -> Self::IntoIter {
        self.bottles.iter()
    }
}
