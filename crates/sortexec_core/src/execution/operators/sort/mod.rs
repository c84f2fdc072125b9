//! Blocking sort operator.
//!
//! Input batches are buffered and sorted in chunks. Sorted chunks are then
//! k-way merged when output is pulled. With a limit, chunks that can't
//! contribute to the output are discarded as they arrive.

pub mod full_sorter;
pub mod merge_state;
pub mod sorter;
