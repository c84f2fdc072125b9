use std::cmp::Ordering;

use sortexec_error::{DbError, Result};

use crate::arrays::batch::Batch;

/// Describes how a single column participates in a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortColumnDescription {
    /// Position of the key column in the batch.
    pub column_idx: usize,
    /// 1 for ascending, -1 for descending.
    pub direction: i8,
    /// Result of comparing a null against a non-null value before
    /// `direction` is applied.
    pub nulls_direction: i8,
}

impl SortColumnDescription {
    pub fn new(column_idx: usize, desc: bool, nulls_first: bool) -> Self {
        let direction = if desc { -1 } else { 1 };
        let nulls_direction = if nulls_first { -direction } else { direction };

        SortColumnDescription {
            column_idx,
            direction,
            nulls_direction,
        }
    }

    pub const fn is_desc(&self) -> bool {
        self.direction < 0
    }
}

/// Total order over rows made up of one or more key columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortDescription {
    columns: Vec<SortColumnDescription>,
}

impl SortDescription {
    pub fn new(columns: impl IntoIterator<Item = SortColumnDescription>) -> Self {
        SortDescription {
            columns: columns.into_iter().collect(),
        }
    }

    pub fn columns(&self) -> &[SortColumnDescription] {
        &self.columns
    }

    /// Check that every key column exists in the batch.
    pub fn validate(&self, batch: &Batch) -> Result<()> {
        for col in &self.columns {
            if col.column_idx >= batch.num_columns() {
                return Err(DbError::new("Sort key column out of bounds")
                    .with_field("column_idx", col.column_idx)
                    .with_field("num_columns", batch.num_columns()));
            }
        }
        Ok(())
    }

    /// Compare a row in `left` with a row in `right`.
    ///
    /// Both batches must have key columns of matching types at the described
    /// positions.
    #[inline]
    pub fn compare_rows(
        &self,
        left: &Batch,
        left_row: usize,
        right: &Batch,
        right_row: usize,
    ) -> Ordering {
        for col in &self.columns {
            let l = &left.arrays[col.column_idx];
            let r = &right.arrays[col.column_idx];

            let ord = l.compare_at(left_row, r, right_row, col.nulls_direction);
            let ord = if col.is_desc() { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }

        Ordering::Equal
    }
}
