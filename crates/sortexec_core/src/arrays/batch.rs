use sortexec_error::{DbError, Result};

use super::array::Array;
use super::datatype::DataType;
use super::scalar::ScalarValue;

/// A batch of same-length arrays.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Batch {
    /// Columns that make up this batch.
    pub(crate) arrays: Vec<Array>,
    /// Number of rows in this batch.
    pub(crate) num_rows: usize,
}

impl Batch {
    pub const fn empty() -> Self {
        Batch {
            arrays: Vec::new(),
            num_rows: 0,
        }
    }

    /// Create a batch with no rows, with empty arrays for each data type.
    pub fn new(datatypes: impl IntoIterator<Item = DataType>, capacity: usize) -> Self {
        let arrays = datatypes
            .into_iter()
            .map(|datatype| Array::with_capacity(datatype, capacity))
            .collect();

        Batch {
            arrays,
            num_rows: 0,
        }
    }

    /// Create a new batch from some number of arrays.
    ///
    /// All arrays must have the same length.
    pub fn try_from_arrays(arrays: impl IntoIterator<Item = Array>) -> Result<Self> {
        let arrays: Vec<_> = arrays.into_iter().collect();
        let num_rows = match arrays.first() {
            Some(arr) => arr.len(),
            None => return Ok(Self::empty()),
        };

        for (idx, array) in arrays.iter().enumerate() {
            if array.len() != num_rows {
                return Err(DbError::new("Arrays in batch have different lengths")
                    .with_field("expected", num_rows)
                    .with_field("got", array.len())
                    .with_field("idx", idx));
            }
        }

        Ok(Batch { arrays, num_rows })
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_columns(&self) -> usize {
        self.arrays.len()
    }

    pub fn arrays(&self) -> &[Array] {
        &self.arrays
    }

    /// Get the array at some column position.
    pub fn array(&self, idx: usize) -> Result<&Array> {
        self.arrays.get(idx).ok_or_else(|| {
            DbError::new("Column index out of bounds")
                .with_field("idx", idx)
                .with_field("num_columns", self.arrays.len())
        })
    }

    pub fn datatypes(&self) -> impl ExactSizeIterator<Item = DataType> + '_ {
        self.arrays.iter().map(|arr| arr.datatype())
    }

    /// If this batch has allocated arrays that can be cleared and written to
    /// instead of allocating new ones.
    pub fn mem_reuse(&self) -> bool {
        !self.arrays.is_empty()
    }

    /// Push a new column onto the end of the batch, returning its position.
    pub fn push_array(&mut self, array: Array) -> Result<usize> {
        if self.arrays.is_empty() {
            self.num_rows = array.len();
        } else if array.len() != self.num_rows {
            return Err(DbError::new("Array length does not match batch row count")
                .with_field("array_len", array.len())
                .with_field("num_rows", self.num_rows));
        }

        self.arrays.push(array);
        Ok(self.arrays.len() - 1)
    }

    /// Empty arrays with the same types as this batch.
    pub fn clone_empty_arrays(&self) -> Vec<Array> {
        self.arrays.iter().map(|arr| arr.clone_empty()).collect()
    }

    pub fn swap(&mut self, other: &mut Batch) {
        std::mem::swap(self, other)
    }

    /// Append all rows from `other` to this batch.
    ///
    /// A batch with no columns adopts the schema of `other`.
    pub fn append(&mut self, other: &Batch) -> Result<()> {
        if self.arrays.is_empty() {
            self.arrays = other.clone_empty_arrays();
            self.num_rows = 0;
        }

        if self.arrays.len() != other.arrays.len() {
            return Err(DbError::new("Cannot append batch with different number of columns")
                .with_field("columns", self.arrays.len())
                .with_field("other_columns", other.arrays.len()));
        }

        for (array, other_array) in self.arrays.iter_mut().zip(&other.arrays) {
            array.append(other_array)?;
        }
        self.num_rows += other.num_rows;

        Ok(())
    }

    /// Append a single row from `src` using the first `num_columns` columns
    /// of `src`.
    ///
    /// This batch must have exactly `num_columns` columns.
    #[inline]
    pub fn append_row_from(&mut self, src: &Batch, row: usize, num_columns: usize) -> Result<()> {
        debug_assert_eq!(num_columns, self.arrays.len());
        for (dst, src) in self.arrays.iter_mut().zip(&src.arrays[..num_columns]) {
            dst.insert_from(src, row)?;
        }
        self.num_rows += 1;
        Ok(())
    }

    /// Move all rows out of this batch into a new batch, leaving this batch
    /// with empty arrays of the same types.
    pub fn take_all(&mut self) -> Batch {
        let empty = self.clone_empty_arrays();
        let arrays = std::mem::replace(&mut self.arrays, empty);
        let num_rows = std::mem::replace(&mut self.num_rows, 0);
        Batch { arrays, num_rows }
    }

    /// Clear all rows while keeping the arrays for reuse.
    pub fn reset_for_write(&mut self) {
        for array in &mut self.arrays {
            array.clear();
        }
        self.num_rows = 0;
    }

    /// Drop the first `n` rows.
    pub fn skip_rows(&mut self, n: usize) {
        let n = usize::min(n, self.num_rows);
        for array in &mut self.arrays {
            array.skip_front(n);
        }
        self.num_rows -= n;
    }

    /// Keep only the first `len` rows.
    pub fn truncate_rows(&mut self, len: usize) {
        if len >= self.num_rows {
            return;
        }
        for array in &mut self.arrays {
            array.truncate(len);
        }
        self.num_rows = len;
    }

    /// Keep only the first `num_columns` columns.
    pub fn truncate_columns(&mut self, num_columns: usize) {
        self.arrays.truncate(num_columns);
        if self.arrays.is_empty() {
            self.num_rows = 0;
        }
    }

    /// Reorder (and possibly drop) rows according to `indices`.
    pub fn permute(&mut self, indices: &[usize]) {
        for array in &mut self.arrays {
            *array = array.take(indices);
        }
        self.num_rows = indices.len();
    }

    /// Replace the columns of this batch with the columns at `indices`.
    ///
    /// Arrays referenced once are moved, not copied.
    pub fn project(&mut self, indices: &[usize]) -> Result<()> {
        let mut uses = vec![0usize; self.arrays.len()];
        for &idx in indices {
            match uses.get_mut(idx) {
                Some(count) => *count += 1,
                None => {
                    return Err(DbError::new("Projection index out of bounds")
                        .with_field("idx", idx)
                        .with_field("num_columns", self.arrays.len()));
                }
            }
        }

        let mut old: Vec<Option<Array>> = std::mem::take(&mut self.arrays)
            .into_iter()
            .map(Some)
            .collect();

        let mut arrays = Vec::with_capacity(indices.len());
        for &idx in indices {
            uses[idx] -= 1;
            let array = if uses[idx] == 0 {
                old[idx].take()
            } else {
                old[idx].clone()
            };
            // Every index was counted above, the slot is populated until its
            // final use.
            if let Some(array) = array {
                arrays.push(array);
            }
        }

        if arrays.is_empty() {
            self.num_rows = 0;
        }
        self.arrays = arrays;

        Ok(())
    }

    /// Get the row at some index.
    pub fn row(&self, idx: usize) -> Option<Vec<ScalarValue>> {
        if idx >= self.num_rows {
            return None;
        }

        self.arrays
            .iter()
            .map(|arr| arr.get_value(idx).ok())
            .collect()
    }
}
