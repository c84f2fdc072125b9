//! Helpers for building and comparing batches in tests.
//!
//! Not gated on `#[cfg(test)]` so integration tests and other crates can use
//! them. Not for use outside of tests.

use super::array::Array;
use super::batch::Batch;

/// Generate a batch from a list of iterators, one per column.
///
/// ```
/// use sortexec_core::generate_batch;
///
/// let batch = generate_batch!([1, 2, 3], ["a", "b", "c"]);
/// assert_eq!(3, batch.num_rows());
/// ```
#[macro_export]
macro_rules! generate_batch {
    ( $( $array_values:expr ),+ $(,)? ) => {{
        $crate::arrays::batch::Batch::try_from_arrays([
            $( $crate::arrays::array::Array::from_iter($array_values), )+
        ])
        .unwrap()
    }};
}

/// Asserts that two arrays are logically equal.
#[track_caller]
pub fn assert_arrays_eq(a: &Array, b: &Array) {
    assert_eq!(a.datatype(), b.datatype(), "data types differ");
    assert_eq!(a.len(), b.len(), "lengths differ");

    for row_idx in 0..a.len() {
        let a_val = a.get_value(row_idx).unwrap();
        let b_val = b.get_value(row_idx).unwrap();

        assert_eq!(a_val, b_val, "values differ at row {row_idx}");
    }
}

/// Asserts that two batches are logically equal.
#[track_caller]
pub fn assert_batches_eq(a: &Batch, b: &Batch) {
    assert_eq!(a.num_rows(), b.num_rows(), "num rows differ");
    assert_eq!(a.num_columns(), b.num_columns(), "num columns differ");

    for col_idx in 0..a.num_columns() {
        let a_col = a.array(col_idx).unwrap();
        let b_col = b.array(col_idx).unwrap();

        assert_arrays_eq(a_col, b_col);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrays_eq_from_options() {
        let a = Array::from_iter([1, 2, 3]);
        let b = Array::from_iter([Some(1), Some(2), Some(3)]);

        assert_arrays_eq(&a, &b);
    }

    #[test]
    #[should_panic]
    fn arrays_not_eq() {
        let a = Array::from_iter([1, 2, 3]);
        let b = Array::from_iter(["a", "b", "c"]);

        assert_arrays_eq(&a, &b);
    }

    #[test]
    fn batches_eq() {
        let a = generate_batch!([1, 2], ["a", "b"]);
        let b = generate_batch!([1, 2], ["a", "b"]);
        assert_batches_eq(&a, &b);
    }
}
