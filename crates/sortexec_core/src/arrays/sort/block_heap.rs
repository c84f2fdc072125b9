use std::cmp::Ordering;

use super::cursor::CursorComparator;
use super::index_heap::IndexHeap;
use super::sort_description::SortDescription;
use crate::arrays::batch::Batch;

/// Max-heap of sorted batches keyed on each batch's last row.
///
/// Only holds indices into a list of batches owned elsewhere. The top of the
/// heap is the batch whose worst row is the worst among all batches in the
/// heap, which bounds every row retained so far.
#[derive(Debug, Default)]
pub struct BlockHeap {
    heap: IndexHeap,
}

impl BlockHeap {
    /// Index of the batch with the worst last row.
    pub fn peek(&self) -> Option<usize> {
        self.heap.peek()
    }

    /// Push a batch onto the heap.
    ///
    /// `batch_idx` must point to a non-empty, sorted batch in `batches`.
    pub fn push(&mut self, batch_idx: usize, batches: &[Batch], desc: &SortDescription) {
        debug_assert!(batches[batch_idx].num_rows() > 0);
        let comparator = CursorComparator::new(batches, desc);
        self.heap
            .push(batch_idx, |a, b| comparator.compare_last_rows(b, a));
    }

    /// Check if every row in `candidate` sorts strictly after every row in the
    /// batch at the top of the heap.
    ///
    /// Since the candidate is sorted, this only needs to compare the
    /// candidate's first row against the top's last row.
    pub fn dominates(&self, candidate: &Batch, batches: &[Batch], desc: &SortDescription) -> bool {
        let top = match self.peek() {
            Some(idx) => &batches[idx],
            None => return false,
        };
        if candidate.num_rows() == 0 || top.num_rows() == 0 {
            return false;
        }

        desc.compare_rows(candidate, 0, top, top.num_rows() - 1) == Ordering::Greater
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::sort::sort_description::SortColumnDescription;
    use crate::generate_batch;

    fn asc() -> SortDescription {
        SortDescription::new([SortColumnDescription::new(0, false, false)])
    }

    #[test]
    fn top_is_worst_last_row() {
        let batches = vec![
            generate_batch!([1, 5]),
            generate_batch!([2, 9]),
            generate_batch!([0, 3]),
        ];
        let desc = asc();

        let mut heap = BlockHeap::default();
        for idx in 0..batches.len() {
            heap.push(idx, &batches, &desc);
        }

        assert_eq!(Some(1), heap.peek());
    }

    #[test]
    fn dominates_strictly_greater() {
        let batches = vec![generate_batch!([1, 5])];
        let desc = asc();
        let mut heap = BlockHeap::default();
        heap.push(0, &batches, &desc);

        assert!(heap.dominates(&generate_batch!([6, 7]), &batches, &desc));
        // Equal first row can still tie into the output.
        assert!(!heap.dominates(&generate_batch!([5, 7]), &batches, &desc));
        assert!(!heap.dominates(&generate_batch!([2, 3]), &batches, &desc));
    }

    #[test]
    fn dominates_descending() {
        let batches = vec![generate_batch!([9, 4])];
        let desc = SortDescription::new([SortColumnDescription::new(0, true, false)]);
        let mut heap = BlockHeap::default();
        heap.push(0, &batches, &desc);

        assert!(heap.dominates(&generate_batch!([3, 1]), &batches, &desc));
        assert!(!heap.dominates(&generate_batch!([8, 1]), &batches, &desc));
    }

    #[test]
    fn empty_heap_never_dominates() {
        let heap = BlockHeap::default();
        assert!(!heap.dominates(&generate_batch!([1]), &[], &asc()));
    }
}
