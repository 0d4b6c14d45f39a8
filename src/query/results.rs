use std::collections::BTreeMap;

use tracing::warn;

use crate::{Error, Result};

/// One streamed response from a search: partial results keyed by query
/// position, plus the positions that finished processing.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchBatch<T> {
    /// Messages for each query position present in this batch.
    pub results: BTreeMap<u32, Vec<T>>,
    /// Positions that will receive no further messages.
    pub finished: Vec<u32>,
}

impl<T> Default for SearchBatch<T> {
    fn default() -> Self {
        Self {
            results: BTreeMap::new(),
            finished: Vec::new(),
        }
    }
}

/// Accumulates streamed batches into per-query result lists.
///
/// Messages for query *i* are appended in arrival order to list *i*,
/// independent of how batches for different queries interleave.
#[derive(Clone, Debug)]
pub struct SearchResults<T> {
    results: Vec<Vec<T>>,
    finished: Vec<bool>,
}

impl<T> SearchResults<T> {
    /// Creates a collector for a search of `queries` expressions.
    pub fn new(queries: usize) -> Self {
        Self {
            results: (0..queries).map(|_| Vec::new()).collect(),
            finished: vec![false; queries],
        }
    }

    /// Number of queries being collected.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// True for a collector of zero queries.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Applies a batch.
    ///
    /// # Errors
    /// Returns [`Error::ResultOutOfRange`] if the batch names a position the
    /// search does not have. The collector is left untouched in that case.
    pub fn absorb(&mut self, batch: SearchBatch<T>) -> Result<()> {
        for &index in batch.results.keys().chain(batch.finished.iter()) {
            self.slot(index)?;
        }

        for (index, messages) in batch.results {
            let slot = index as usize;
            if self.finished[slot] && !messages.is_empty() {
                warn!(query = index, "Results arrived for a finished query");
            }
            self.results[slot].extend(messages);
        }

        for index in batch.finished {
            self.finished[index as usize] = true;
        }

        Ok(())
    }

    /// Applies every batch of a stream in order, stopping at the first error.
    ///
    /// # Errors
    /// See [`SearchResults::absorb`].
    pub fn absorb_all(&mut self, batches: impl IntoIterator<Item = SearchBatch<T>>) -> Result<()> {
        batches.into_iter().try_for_each(|batch| self.absorb(batch))
    }

    /// Whether the service reported query `index` as finished.
    pub fn is_finished(&self, index: usize) -> bool {
        self.finished.get(index).copied().unwrap_or(false)
    }

    /// Whether every query has finished.
    pub fn is_complete(&self) -> bool {
        self.finished.iter().all(|&done| done)
    }

    /// Messages gathered so far for query `index`.
    pub fn get(&self, index: usize) -> Option<&[T]> {
        self.results.get(index).map(Vec::as_slice)
    }

    /// Result lists in query-position order.
    pub fn into_results(self) -> Vec<Vec<T>> {
        self.results
    }

    fn slot(&self, index: u32) -> Result<usize> {
        let slot = index as usize;
        if slot >= self.results.len() {
            return Err(Error::ResultOutOfRange {
                index,
                queries: self.results.len(),
            });
        }
        Ok(slot)
    }
}
