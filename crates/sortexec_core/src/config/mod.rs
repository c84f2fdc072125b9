pub mod execution;
pub mod sort;
