//! Cyclic batch generation for model consumption.
//!
//! The embedding model is driven by a fixed number of prediction steps, so
//! the batcher never terminates on its own: after one pass over the source
//! it wraps around and starts again. The consumer decides how many batches
//! to pull and simply stops iterating (or drops the batcher) when done.

use crate::core::errors::{PipelineError, PipelineResult};

/// An unbounded, restartable iterator of fixed-size batches over a slice.
///
/// Batches are consecutive windows of `batch_size` elements in source order.
/// When the source length is not a multiple of the batch size, the final
/// window of each pass is shorter and is not padded. After a pass completes
/// the cursor wraps to the beginning, so iteration repeats the same batch
/// sequence deterministically forever.
///
/// An optional per-element transform is applied before grouping; without
/// one, elements are cloned through unchanged.
///
/// # Example
///
/// ```
/// use logo_embed::core::CyclicBatcher;
///
/// let items = vec![1, 2, 3, 4, 5, 6, 7];
/// let batches: Vec<_> = CyclicBatcher::new(&items, 3).unwrap().take(4).collect();
/// assert_eq!(batches[0], vec![1, 2, 3]);
/// assert_eq!(batches[2], vec![7]);
/// assert_eq!(batches[3], vec![1, 2, 3]);
/// ```
pub struct CyclicBatcher<'a, T, U = T> {
    source: &'a [T],
    batch_size: usize,
    cursor: usize,
    transform: Box<dyn Fn(&T) -> U + 'a>,
}

impl<'a, T: Clone> CyclicBatcher<'a, T, T> {
    /// Creates a batcher that passes elements through unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if `batch_size` is zero or `source` is empty.
    pub fn new(source: &'a [T], batch_size: usize) -> PipelineResult<Self> {
        Self::with_transform(source, batch_size, T::clone)
    }
}

impl<'a, T, U> CyclicBatcher<'a, T, U> {
    /// Creates a batcher that applies `transform` to each element
    /// independently before grouping it into a batch.
    ///
    /// # Errors
    ///
    /// Returns an error if `batch_size` is zero or `source` is empty. An
    /// empty source would otherwise cycle forever without ever producing
    /// a batch.
    pub fn with_transform<F>(source: &'a [T], batch_size: usize, transform: F) -> PipelineResult<Self>
    where
        F: Fn(&T) -> U + 'a,
    {
        if batch_size == 0 {
            return Err(PipelineError::invalid_input(
                "batch size must be greater than zero",
            ));
        }
        if source.is_empty() {
            return Err(PipelineError::invalid_input("batch source must not be empty"));
        }
        Ok(Self {
            source,
            batch_size,
            cursor: 0,
            transform: Box::new(transform),
        })
    }

    /// The number of batches in one full pass over the source.
    pub fn batches_per_pass(&self) -> usize {
        self.source.len().div_ceil(self.batch_size)
    }
}

impl<'a, T, U> Iterator for CyclicBatcher<'a, T, U> {
    type Item = Vec<U>;

    fn next(&mut self) -> Option<Self::Item> {
        let end = (self.cursor + self.batch_size).min(self.source.len());
        let batch = self.source[self.cursor..end]
            .iter()
            .map(|item| (self.transform)(item))
            .collect();
        // Wrap at the end of a pass; the sequence never terminates.
        self.cursor = if end == self.source.len() { 0 } else { end };
        Some(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_lengths_cycle_over_short_tail() {
        let items: Vec<u32> = (0..7).collect();
        let batcher = CyclicBatcher::new(&items, 3).unwrap();

        let lengths: Vec<usize> = batcher.take(7).map(|b| b.len()).collect();
        assert_eq!(lengths, vec![3, 3, 1, 3, 3, 1, 3]);
    }

    #[test]
    fn test_one_pass_reconstructs_source_in_order() {
        let items: Vec<u32> = (0..7).collect();
        let batcher = CyclicBatcher::new(&items, 3).unwrap();
        assert_eq!(batcher.batches_per_pass(), 3);

        let flattened: Vec<u32> = batcher.take(3).flatten().collect();
        assert_eq!(flattened, items);
    }

    #[test]
    fn test_passes_repeat_deterministically() {
        let items = vec!["a", "b", "c", "d", "e"];
        let batcher = CyclicBatcher::new(&items, 2).unwrap();

        let batches: Vec<Vec<&str>> = batcher.take(6).collect();
        assert_eq!(batches[0], batches[3]);
        assert_eq!(batches[1], batches[4]);
        assert_eq!(batches[2], batches[5]);
    }

    #[test]
    fn test_transform_applied_per_element() {
        let items = vec![1u32, 2, 3, 4];
        let batcher = CyclicBatcher::with_transform(&items, 3, |v| v * 10).unwrap();

        let batches: Vec<Vec<u32>> = batcher.take(2).collect();
        assert_eq!(batches[0], vec![10, 20, 30]);
        assert_eq!(batches[1], vec![40]);
    }

    #[test]
    fn test_exact_multiple_has_no_short_batch() {
        let items: Vec<u32> = (0..6).collect();
        let batcher = CyclicBatcher::new(&items, 3).unwrap();

        let lengths: Vec<usize> = batcher.take(4).map(|b| b.len()).collect();
        assert_eq!(lengths, vec![3, 3, 3, 3]);
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let items = vec![1u32];
        let result = CyclicBatcher::new(&items, 0);
        assert!(matches!(result, Err(PipelineError::InvalidInput { .. })));
    }

    #[test]
    fn test_empty_source_is_rejected() {
        let items: Vec<u32> = Vec::new();
        let result = CyclicBatcher::new(&items, 3);
        assert!(matches!(result, Err(PipelineError::InvalidInput { .. })));
    }
}
