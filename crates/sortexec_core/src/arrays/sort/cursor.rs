use std::cmp::Ordering;

use super::sort_description::SortDescription;
use crate::arrays::batch::Batch;

/// Read position in a single sorted batch.
///
/// The cursor refers to its batch by index into the list of batches owned by
/// the merge state, it never holds a reference to the batch itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortCursor {
    batch_idx: usize,
    pos: usize,
    rows: usize,
}

impl SortCursor {
    pub fn new(batch_idx: usize, rows: usize) -> Self {
        SortCursor {
            batch_idx,
            pos: 0,
            rows,
        }
    }

    pub fn batch_idx(&self) -> usize {
        self.batch_idx
    }

    /// Current row in the batch.
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn is_exhausted(&self) -> bool {
        self.pos >= self.rows
    }

    pub fn advance(&mut self) {
        debug_assert!(!self.is_exhausted());
        self.pos += 1;
    }
}

/// Compares cursors by their current rows.
///
/// Holds on to the batches and the sort description for the lifetime of a
/// merge step so that individual comparisons don't need to look either up.
#[derive(Debug, Clone, Copy)]
pub struct CursorComparator<'a> {
    batches: &'a [Batch],
    desc: &'a SortDescription,
}

impl<'a> CursorComparator<'a> {
    pub fn new(batches: &'a [Batch], desc: &'a SortDescription) -> Self {
        CursorComparator { batches, desc }
    }

    /// Compare the current rows of two cursors.
    ///
    /// Equal rows are ordered by batch index.
    #[inline]
    pub fn compare(&self, a: &SortCursor, b: &SortCursor) -> Ordering {
        self.desc
            .compare_rows(
                &self.batches[a.batch_idx],
                a.pos,
                &self.batches[b.batch_idx],
                b.pos,
            )
            .then(a.batch_idx.cmp(&b.batch_idx))
    }

    /// Compare the last (worst) rows of two batches.
    ///
    /// Both batches must contain at least one row.
    #[inline]
    pub fn compare_last_rows(&self, a_batch: usize, b_batch: usize) -> Ordering {
        let a = &self.batches[a_batch];
        let b = &self.batches[b_batch];

        self.desc
            .compare_rows(a, a.num_rows() - 1, b, b.num_rows() - 1)
            .then(a_batch.cmp(&b_batch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::sort::sort_description::SortColumnDescription;
    use crate::generate_batch;

    #[test]
    fn cursor_lifecycle() {
        let mut cursor = SortCursor::new(0, 2);
        assert!(!cursor.is_exhausted());

        cursor.advance();
        assert!(!cursor.is_exhausted());
        assert_eq!(1, cursor.pos());

        cursor.advance();
        assert!(cursor.is_exhausted());
    }

    #[test]
    fn compare_current_rows() {
        let batches = vec![generate_batch!([1, 4]), generate_batch!([2, 3])];
        let desc = SortDescription::new([SortColumnDescription::new(0, false, false)]);
        let cmp = CursorComparator::new(&batches, &desc);

        let mut a = SortCursor::new(0, 2);
        let b = SortCursor::new(1, 2);
        assert_eq!(Ordering::Less, cmp.compare(&a, &b));

        a.advance();
        assert_eq!(Ordering::Greater, cmp.compare(&a, &b));

        assert_eq!(Ordering::Greater, cmp.compare_last_rows(0, 1));
    }

    #[test]
    fn equal_rows_ordered_by_batch() {
        let batches = vec![generate_batch!([7]), generate_batch!([7])];
        let desc = SortDescription::new([SortColumnDescription::new(0, false, false)]);
        let cmp = CursorComparator::new(&batches, &desc);

        assert_eq!(
            Ordering::Less,
            cmp.compare(&SortCursor::new(0, 1), &SortCursor::new(1, 1))
        );
    }
}
