//! Universe management for the lncap pipeline.
//!
//! A universe is the set of index members, rebuilt from the constituent
//! table: which instruments belonged to the index on which dates.

pub mod index;

pub use index::IndexCode;

use chrono::NaiveDate;
use lncap_data::ConstituentRecord;
use std::collections::{BTreeMap, BTreeSet};

/// Trait for stock universes.
pub trait Universe {
    /// Get all symbols in the universe.
    fn symbols(&self) -> Vec<String>;

    /// Check if a symbol is in the universe.
    fn contains(&self, symbol: &str) -> bool {
        self.symbols().iter().any(|s| s == symbol)
    }

    /// Get the number of constituents.
    fn size(&self) -> usize {
        self.symbols().len()
    }
}

/// Index membership over time.
#[derive(Debug, Clone, Default)]
pub struct IndexUniverse {
    index: String,
    members: BTreeMap<NaiveDate, BTreeSet<String>>,
}

impl IndexUniverse {
    /// Build from constituent records of `index`.
    pub fn from_records(index: impl Into<String>, records: &[ConstituentRecord]) -> Self {
        let mut members: BTreeMap<NaiveDate, BTreeSet<String>> = BTreeMap::new();
        for record in records {
            members
                .entry(record.date)
                .or_default()
                .insert(record.instrument.clone());
        }
        Self {
            index: index.into(),
            members,
        }
    }

    /// Index code.
    pub fn index(&self) -> &str {
        &self.index
    }

    /// Preset for the index code, if it is one.
    pub fn preset(&self) -> Option<IndexCode> {
        IndexCode::from_code(&self.index)
    }

    /// Dates with a membership snapshot, ascending.
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.members.keys().copied().collect()
    }

    /// Members on `date`, empty when there is no snapshot for that date.
    pub fn members_on(&self, date: NaiveDate) -> Vec<String> {
        self.members
            .get(&date)
            .map(|m| m.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether `symbol` was a member on `date`.
    pub fn is_member(&self, symbol: &str, date: NaiveDate) -> bool {
        self.members.get(&date).is_some_and(|m| m.contains(symbol))
    }
}

impl Universe for IndexUniverse {
    /// Every instrument that was a member on any date, sorted.
    fn symbols(&self) -> Vec<String> {
        let all: BTreeSet<&String> = self.members.values().flatten().collect();
        all.into_iter().cloned().collect()
    }
}
