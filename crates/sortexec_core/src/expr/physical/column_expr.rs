use std::fmt;

use sortexec_error::{DbError, Result};

use crate::arrays::batch::Batch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalColumnExpr {
    pub idx: usize,
}

impl PhysicalColumnExpr {
    pub fn new(idx: usize) -> Self {
        PhysicalColumnExpr { idx }
    }

    /// Columns are already materialized, this only checks that the column
    /// exists.
    pub fn execute(&self, batch: &Batch) -> Result<usize> {
        if self.idx >= batch.num_columns() {
            return Err(DbError::new(format!(
                "Tried to get column at index {} in a batch with {} columns",
                self.idx,
                batch.num_columns()
            )));
        }
        Ok(self.idx)
    }
}

impl fmt::Display for PhysicalColumnExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.idx)
    }
}
