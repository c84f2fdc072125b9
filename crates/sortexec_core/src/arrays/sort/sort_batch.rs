use sortexec_error::Result;

use super::sort_description::SortDescription;
use crate::arrays::batch::Batch;

/// Sort the rows of a batch in place.
///
/// With a limit, only the first `limit` rows in sort order are kept. Rows that
/// compare equal keep their original relative order.
pub fn sort_batch(batch: &mut Batch, desc: &SortDescription, limit: Option<usize>) -> Result<()> {
    desc.validate(batch)?;

    let num_rows = batch.num_rows();
    let mut indices: Vec<usize> = (0..num_rows).collect();

    let cmp = |a: &usize, b: &usize| desc.compare_rows(batch, *a, batch, *b).then(a.cmp(b));

    match limit {
        Some(0) => indices.clear(),
        Some(limit) if limit < num_rows => {
            indices.select_nth_unstable_by(limit - 1, cmp);
            indices.truncate(limit);
            indices.sort_unstable_by(cmp);
        }
        _ => indices.sort_unstable_by(cmp),
    }

    // Skip the copy if nothing moved.
    if indices.len() == num_rows && indices.iter().enumerate().all(|(i, &idx)| i == idx) {
        return Ok(());
    }

    batch.permute(&indices);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrays::sort::sort_description::SortColumnDescription;
    use crate::arrays::testutil::assert_batches_eq;
    use crate::generate_batch;

    fn asc(col: usize) -> SortColumnDescription {
        SortColumnDescription::new(col, false, false)
    }

    #[test]
    fn sort_single_key() {
        let mut batch = generate_batch!([3, 1, 2], ["c", "a", "b"]);
        sort_batch(&mut batch, &SortDescription::new([asc(0)]), None).unwrap();

        assert_batches_eq(&generate_batch!([1, 2, 3], ["a", "b", "c"]), &batch);
    }

    #[test]
    fn sort_with_limit() {
        let mut batch = generate_batch!([5, 4, 9, 1, 7]);
        sort_batch(&mut batch, &SortDescription::new([asc(0)]), Some(2)).unwrap();

        assert_batches_eq(&generate_batch!([1, 4]), &batch);
    }

    #[test]
    fn limit_larger_than_batch() {
        let mut batch = generate_batch!([2, 1]);
        sort_batch(&mut batch, &SortDescription::new([asc(0)]), Some(10)).unwrap();

        assert_batches_eq(&generate_batch!([1, 2]), &batch);
    }

    #[test]
    fn limit_zero() {
        let mut batch = generate_batch!([2, 1]);
        sort_batch(&mut batch, &SortDescription::new([asc(0)]), Some(0)).unwrap();

        assert_eq!(0, batch.num_rows());
        assert_eq!(1, batch.num_columns());
    }

    #[test]
    fn stable_on_ties() {
        let mut batch = generate_batch!([1, 0, 1, 0], ["a", "b", "c", "d"]);
        sort_batch(&mut batch, &SortDescription::new([asc(0)]), None).unwrap();

        assert_batches_eq(&generate_batch!([0, 0, 1, 1], ["b", "d", "a", "c"]), &batch);
    }

    #[test]
    fn desc_nulls_first() {
        let mut batch = generate_batch!([Some(2), None, Some(5)]);
        let desc = SortDescription::new([SortColumnDescription::new(0, true, true)]);
        sort_batch(&mut batch, &desc, None).unwrap();

        assert_batches_eq(&generate_batch!([None, Some(5), Some(2)]), &batch);
    }

    #[test]
    fn key_out_of_bounds() {
        let mut batch = generate_batch!([1]);
        sort_batch(&mut batch, &SortDescription::new([asc(3)]), None).unwrap_err();
    }
}
