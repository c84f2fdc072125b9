use sortexec_error::{DbError, Result};

use crate::arrays::batch::Batch;
use crate::arrays::datatype::DataType;
use crate::arrays::sort::cursor::{CursorComparator, SortCursor};
use crate::arrays::sort::index_heap::IndexHeap;
use crate::arrays::sort::sort_description::SortDescription;
use crate::config::execution::ExecutionContext;

/// State for merging a set of individually sorted batches into a single
/// ordered stream.
///
/// Sorted batches are only appended until the merge tree is built. After that
/// the list is only read from, except for releasing batches once their
/// cursor is exhausted.
#[derive(Debug)]
pub struct MergeSorterState {
    /// Description used to sort every batch in `sorted_batches`.
    desc: SortDescription,
    /// Number of leading columns in each sorted batch that make up the
    /// output. Remaining columns only hold sort keys.
    num_output_columns: usize,
    /// Output types, captured when the merge tree is built.
    output_types: Vec<DataType>,
    sorted_batches: Vec<Batch>,
    /// One cursor per sorted batch, same position.
    cursors: Vec<SortCursor>,
    /// Min-heap of cursor indices.
    queue: IndexHeap,
    /// Rows remaining to skip before emitting.
    offset: usize,
    /// Rows remaining to emit, None if unbounded.
    remaining: Option<usize>,
    /// Running total of rows admitted while filling a bounded result.
    num_rows: usize,
}

impl MergeSorterState {
    pub fn new(offset: usize, limit: Option<usize>) -> Self {
        MergeSorterState {
            desc: SortDescription::default(),
            num_output_columns: 0,
            output_types: Vec::new(),
            sorted_batches: Vec::new(),
            cursors: Vec::new(),
            queue: IndexHeap::default(),
            offset,
            remaining: limit,
            num_rows: 0,
        }
    }

    pub fn sorted_batches(&self) -> &[Batch] {
        &self.sorted_batches
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn add_num_rows(&mut self, rows: usize) {
        self.num_rows += rows;
    }

    /// Add a sorted batch, returning its index.
    ///
    /// Every batch must have been sorted with the same description, have the
    /// same number of output columns, and have the same column types. The
    /// first batch added determines all three.
    pub fn add_sorted_batch(
        &mut self,
        batch: Batch,
        desc: &SortDescription,
        num_output_columns: usize,
    ) -> Result<usize> {
        debug_assert!(self.cursors.is_empty(), "merge tree already built");

        match self.sorted_batches.first() {
            None => {
                self.desc = desc.clone();
                self.num_output_columns = num_output_columns;
            }
            Some(first) => {
                if &self.desc != desc
                    || self.num_output_columns != num_output_columns
                    || !first.datatypes().eq(batch.datatypes())
                {
                    return Err(DbError::new(
                        "Sorted batch layout differs from previously sorted batches",
                    )
                    .with_field("num_output_columns", num_output_columns)
                    .with_field("expected_num_output_columns", self.num_output_columns)
                    .with_field("num_columns", batch.num_columns())
                    .with_field("expected_num_columns", first.num_columns()));
                }
            }
        }

        self.sorted_batches.push(batch);
        Ok(self.sorted_batches.len() - 1)
    }

    /// Create cursors for every sorted batch.
    ///
    /// The queue is only populated when there's more than one batch. A single
    /// batch is already in its final order.
    pub fn build_merge_tree(&mut self) {
        self.output_types = match self.sorted_batches.first() {
            Some(batch) => batch.datatypes().take(self.num_output_columns).collect(),
            None => Vec::new(),
        };

        self.cursors = self
            .sorted_batches
            .iter()
            .enumerate()
            .map(|(idx, batch)| SortCursor::new(idx, batch.num_rows()))
            .collect();

        if self.sorted_batches.len() > 1 {
            self.init_queue();
        }
    }

    fn init_queue(&mut self) {
        self.queue = IndexHeap::with_capacity(self.cursors.len());
        let comparator = CursorComparator::new(&self.sorted_batches, &self.desc);
        let cursors = &self.cursors;

        for (idx, cursor) in cursors.iter().enumerate() {
            if !cursor.is_exhausted() {
                self.queue
                    .push(idx, |a, b| comparator.compare(&cursors[a], &cursors[b]));
            }
        }
    }

    /// Take the single sorted batch out of the state, with the offset
    /// skipped, the limit applied, and key-only columns dropped.
    ///
    /// Returns None if there isn't exactly one sorted batch, or if it has
    /// already been taken.
    pub fn take_single(&mut self) -> Option<Batch> {
        if self.sorted_batches.len() != 1 || !self.sorted_batches[0].mem_reuse() {
            return None;
        }

        let mut batch = std::mem::take(&mut self.sorted_batches[0]);
        let skip = usize::min(self.offset, batch.num_rows());
        batch.skip_rows(skip);
        self.offset -= skip;

        if let Some(remaining) = &mut self.remaining {
            batch.truncate_rows(*remaining);
            *remaining -= batch.num_rows();
        }
        batch.truncate_columns(self.num_output_columns);

        Some(batch)
    }

    /// Merge the next set of rows into `out`.
    ///
    /// Returns true once there are no more rows to produce. When that
    /// happens, `out` is left untouched.
    pub fn merge_sort_read(&mut self, context: &ExecutionContext, out: &mut Batch) -> Result<bool> {
        while self.offset > 0 {
            if self.advance_top().is_none() {
                break;
            }
            self.offset -= 1;
        }

        let quota = match self.remaining {
            Some(remaining) => usize::min(remaining, context.batch_size()),
            None => context.batch_size(),
        };
        if quota == 0 || self.queue.is_empty() {
            return Ok(true);
        }

        let reuse = out.mem_reuse() && out.datatypes().eq(self.output_types.iter().copied());
        let mut fresh = None;
        let merged = if reuse {
            out.reset_for_write();
            &mut *out
        } else {
            fresh.insert(Batch::new(self.output_types.iter().copied(), quota))
        };

        let mut merged_rows = 0;
        while merged_rows < quota {
            let cursor = match self.queue.peek() {
                Some(idx) => self.cursors[idx],
                None => break,
            };

            merged.append_row_from(
                &self.sorted_batches[cursor.batch_idx()],
                cursor.pos(),
                self.num_output_columns,
            )?;
            merged_rows += 1;

            self.advance_top();
        }

        if let Some(remaining) = &mut self.remaining {
            *remaining -= merged_rows;
        }

        if let Some(mut fresh) = fresh {
            out.swap(&mut fresh);
        }

        Ok(false)
    }

    /// Advance the cursor at the top of the queue, returning the index of the
    /// cursor that was advanced.
    ///
    /// Exhausted cursors are removed from the queue and their batch is
    /// released.
    fn advance_top(&mut self) -> Option<usize> {
        let top = self.queue.peek()?;
        self.cursors[top].advance();

        let comparator = CursorComparator::new(&self.sorted_batches, &self.desc);
        let cursors = &self.cursors;
        let cmp = |a: usize, b: usize| comparator.compare(&cursors[a], &cursors[b]);

        if cursors[top].is_exhausted() {
            self.queue.pop(cmp);
            let batch_idx = self.cursors[top].batch_idx();
            self.sorted_batches[batch_idx] = Batch::empty();
        } else {
            self.queue.update_top(cmp);
        }

        Some(top)
    }
}
