//! Fixed-window batching of input records.

use crate::error::{Result, TriageError};
use crate::record::Record;

/// Default number of records per batch.
pub const DEFAULT_WINDOW_SIZE: usize = 1000;

/// A contiguous, non-empty run of records identified by its inclusive index range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch<T = Record> {
    start_index: usize,
    records: Vec<T>,
}

impl<T> Batch<T> {
    /// Index of the first record in the original sequence.
    pub fn start_index(&self) -> usize {
        self.start_index
    }

    /// Index of the last record in the original sequence (inclusive).
    pub fn end_index(&self) -> usize {
        self.start_index + self.records.len() - 1
    }

    /// `(start_index, end_index)`
    pub fn range(&self) -> (usize, usize) {
        (self.start_index(), self.end_index())
    }

    pub fn records(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<T> {
        self.records
    }
}

/// Splits `records` into windows of `window_size`; only the last batch may be shorter.
///
/// Batches are disjoint and, concatenated in order, reproduce `records`.
/// An empty input produces no batches.
///
/// # Errors
///
/// Returns [`TriageError::Configuration`] if `window_size` is zero.
pub fn partition<T>(records: Vec<T>, window_size: usize) -> Result<Vec<Batch<T>>> {
    if window_size == 0 {
        return Err(TriageError::config("window size must be greater than zero"));
    }

    let mut batches = Vec::with_capacity(records.len().div_ceil(window_size));
    let mut start_index = 0;
    let mut remaining = records.into_iter().peekable();

    while remaining.peek().is_some() {
        let window: Vec<T> = remaining.by_ref().take(window_size).collect();
        let len = window.len();
        batches.push(Batch {
            start_index,
            records: window,
        });
        start_index += len;
    }

    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn example_2500_records_window_1000() {
        let batches = partition((0..2500).collect::<Vec<_>>(), 1000).unwrap();
        let ranges: Vec<_> = batches.iter().map(Batch::range).collect();
        assert_eq!(ranges, vec![(0, 999), (1000, 1999), (2000, 2499)]);
    }

    #[test]
    fn concatenation_reproduces_input() {
        for total in [0usize, 1, 2, 7, 10, 11, 99] {
            for window in 1..=12 {
                let input: Vec<usize> = (0..total).collect();
                let batches = partition(input.clone(), window).unwrap();

                let mut expected_start = 0;
                for batch in &batches {
                    assert_eq!(batch.start_index(), expected_start);
                    assert!(batch.len() <= window);
                    expected_start = batch.end_index() + 1;
                }
                assert_eq!(expected_start, total);

                // Every batch except possibly the last is full
                if let Some((_last, full)) = batches.split_last() {
                    assert!(full.iter().all(|b| b.len() == window));
                }

                let rebuilt: Vec<usize> =
                    batches.into_iter().flat_map(Batch::into_records).collect();
                assert_eq!(rebuilt, input);
            }
        }
    }

    #[test]
    fn empty_input_yields_no_batches() {
        let batches = partition(Vec::<Record>::new(), 1000).unwrap();
        assert!(batches.is_empty());
    }

    #[test]
    fn zero_window_is_configuration_error() {
        let err = partition(vec![1, 2, 3], 0).unwrap_err();
        assert!(err.is_config());
    }
}
