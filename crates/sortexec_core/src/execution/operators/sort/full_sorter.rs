use serde::{Deserialize, Serialize};
use sortexec_error::Result;
use tracing::{debug, trace};

use super::merge_state::MergeSorterState;
use super::sorter::Sorter;
use crate::arrays::batch::Batch;
use crate::arrays::sort::block_heap::BlockHeap;
use crate::config::execution::ExecutionContext;
use crate::config::sort::SortConfig;
use crate::expr::physical::SortExpressions;

/// Counters describing the work done by a sorter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortStats {
    /// Rows passed to `append_block`.
    pub input_rows: usize,
    /// Number of times buffered rows were sorted into a non-empty batch.
    pub sort_steps: usize,
    pub retained_batches: usize,
    pub retained_rows: usize,
    /// Sorted batches discarded because none of their rows could be part of
    /// the output.
    pub pruned_batches: usize,
    pub pruned_rows: usize,
    pub emitted_rows: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SortPhase {
    /// Accepting input.
    Collecting,
    /// Merge tree built, producing output.
    Reading,
    /// All output produced.
    Finished,
}

/// Sort operator producing a totally ordered stream from unordered input.
///
/// Call order is strict: `append_block` any number of times, then
/// `prepare_for_read` once, then `get_next` until it reports the end of the
/// stream. Violating this order panics.
///
/// With a limit configured, only the `offset + limit` best rows of every
/// sorted chunk are kept. Once enough rows are retained, incoming chunks whose
/// best row is worse than the worst row of the worst retained chunk are
/// discarded without being buffered.
#[derive(Debug)]
pub struct FullSorter {
    config: SortConfig,
    sorter: Sorter,
    /// Input rows not yet sorted.
    unsorted: Batch,
    state: MergeSorterState,
    /// Retained batches ordered by their worst row. Only populated with a
    /// limit.
    block_heap: BlockHeap,
    phase: SortPhase,
    stats: SortStats,
}

impl FullSorter {
    pub fn try_new(exprs: SortExpressions, config: SortConfig) -> Result<Self> {
        config.validate()?;

        Ok(FullSorter {
            sorter: Sorter::new(exprs, config.limit, config.offset),
            unsorted: Batch::empty(),
            state: MergeSorterState::new(config.offset, config.limit),
            block_heap: BlockHeap::default(),
            phase: SortPhase::Collecting,
            stats: SortStats::default(),
            config,
        })
    }

    pub fn config(&self) -> &SortConfig {
        &self.config
    }

    pub fn stats(&self) -> &SortStats {
        &self.stats
    }

    /// Buffer an input batch, sorting the buffered rows once enough have
    /// accumulated.
    ///
    /// Panics if the batch has no rows, or if called after
    /// `prepare_for_read`.
    pub fn append_block(&mut self, batch: Batch) -> Result<()> {
        assert!(
            self.phase == SortPhase::Collecting,
            "append_block called after prepare_for_read"
        );
        assert!(batch.num_rows() > 0, "append_block called with an empty batch");

        self.stats.input_rows += batch.num_rows();
        if self.unsorted.num_rows() == 0 {
            self.unsorted = batch;
        } else {
            self.unsorted.append(&batch)?;
        }

        if self.reach_limit() {
            self.do_sort()?;
        }

        Ok(())
    }

    /// Sort any remaining buffered rows and build the merge tree.
    ///
    /// Panics if called more than once.
    pub fn prepare_for_read(&mut self) -> Result<()> {
        assert!(
            self.phase == SortPhase::Collecting,
            "prepare_for_read called more than once"
        );

        if self.unsorted.num_rows() > 0 {
            self.do_sort()?;
        }
        self.unsorted = Batch::empty();

        self.state.build_merge_tree();
        self.phase = SortPhase::Reading;

        debug!(
            retained_batches = self.stats.retained_batches,
            retained_rows = self.stats.retained_rows,
            pruned_batches = self.stats.pruned_batches,
            pruned_rows = self.stats.pruned_rows,
            "prepared sort for reading"
        );

        Ok(())
    }

    /// Write the next set of sorted rows to `out`.
    ///
    /// Returns true once the stream is exhausted. With multiple sorted
    /// batches, the final call writes nothing and leaves `out` untouched.
    /// With exactly one sorted batch, that batch is written to `out` and true
    /// is returned on the same call.
    ///
    /// Panics if called before `prepare_for_read`.
    pub fn get_next(&mut self, context: &ExecutionContext, out: &mut Batch) -> Result<bool> {
        match self.phase {
            SortPhase::Collecting => panic!("get_next called before prepare_for_read"),
            SortPhase::Finished => return Ok(true),
            SortPhase::Reading => (),
        }

        match self.state.sorted_batches().len() {
            0 => {
                self.phase = SortPhase::Finished;
                Ok(true)
            }
            1 => {
                if let Some(mut batch) = self.state.take_single() {
                    if batch.num_rows() > 0 {
                        self.stats.emitted_rows += batch.num_rows();
                        out.swap(&mut batch);
                    }
                }
                self.phase = SortPhase::Finished;
                Ok(true)
            }
            _ => {
                let eos = self.state.merge_sort_read(context, out)?;
                if eos {
                    self.phase = SortPhase::Finished;
                    debug!(emitted_rows = self.stats.emitted_rows, "sort exhausted");
                } else {
                    self.stats.emitted_rows += out.num_rows();
                }
                Ok(eos)
            }
        }
    }

    fn reach_limit(&self) -> bool {
        self.unsorted.num_rows() >= self.config.buffered_rows_threshold
    }

    /// Sort the buffered rows and admit the result.
    fn do_sort(&mut self) -> Result<()> {
        let mut batch = self.unsorted.take_all();
        let num_output_columns = self.sorter.partial_sort(&mut batch)?;

        let rows = batch.num_rows();
        if rows == 0 {
            return Ok(());
        }
        self.stats.sort_steps += 1;

        let desc = self.sorter.sort_description();
        match self.config.retain_bound() {
            None => {
                self.state.add_sorted_batch(batch, desc, num_output_columns)?;
            }
            Some(bound) if self.state.num_rows() < bound => {
                let idx = self.state.add_sorted_batch(batch, desc, num_output_columns)?;
                self.state.add_num_rows(rows);
                self.block_heap.push(idx, self.state.sorted_batches(), desc);
            }
            Some(_) => {
                if self.config.enable_topn_pruning
                    && self
                        .block_heap
                        .dominates(&batch, self.state.sorted_batches(), desc)
                {
                    trace!(rows, "pruned sorted batch");
                    self.stats.pruned_batches += 1;
                    self.stats.pruned_rows += rows;
                    return Ok(());
                }

                let idx = self.state.add_sorted_batch(batch, desc, num_output_columns)?;
                self.block_heap.push(idx, self.state.sorted_batches(), desc);
            }
        }

        trace!(rows, "retained sorted batch");
        self.stats.retained_batches += 1;
        self.stats.retained_rows += rows;

        Ok(())
    }
}
