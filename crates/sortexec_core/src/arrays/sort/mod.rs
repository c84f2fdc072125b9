//! Row ordering primitives shared by the sort operators.

pub mod block_heap;
pub mod cursor;
pub mod index_heap;
pub mod sort_batch;
pub mod sort_description;
