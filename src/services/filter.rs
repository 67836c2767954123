//! Filter engine: narrows a record set to the active selection

use std::collections::BTreeSet;

use crate::types::{FilterState, TransactionRecord};

pub struct FilterEngine;

impl FilterEngine {
    /// Keep the records matching every non-wildcard field of `filter`.
    /// Single pass; relative order of the input is preserved.
    pub fn apply<'a>(
        records: &'a [TransactionRecord],
        filter: &FilterState,
    ) -> Vec<&'a TransactionRecord> {
        if filter.is_wildcard() {
            return records.iter().collect();
        }
        records.iter().filter(|r| filter.matches(r)).collect()
    }

    /// Distinct non-empty brands, sorted, for the brand selector
    pub fn unique_brands(records: &[TransactionRecord]) -> Vec<String> {
        records
            .iter()
            .filter(|r| !r.brand.is_empty())
            .map(|r| r.brand.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(String::from)
            .collect()
    }
}
