//! Randomized checks of the sort operator against a naive in-memory sort.

use std::cmp::Ordering;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sortexec_core::arrays::array::Array;
use sortexec_core::arrays::batch::Batch;
use sortexec_core::arrays::scalar::ScalarValue;
use sortexec_core::config::execution::ExecutionContext;
use sortexec_core::config::sort::SortConfig;
use sortexec_core::execution::operators::sort::full_sorter::{FullSorter, SortStats};
use sortexec_core::expr::physical::{
    PhysicalScalarExpression,
    PhysicalSortExpression,
    SortExpressions,
};

/// A row of generated input, a nullable key and a unique row id.
type Row = (Option<i64>, i64);

fn generate_inputs(rng: &mut ChaCha8Rng, num_batches: usize, max_rows: usize) -> Vec<Vec<Row>> {
    let mut next_id = 0;
    (0..num_batches)
        .map(|_| {
            let rows = rng.random_range(1..=max_rows);
            (0..rows)
                .map(|_| {
                    let key = if rng.random_bool(0.1) {
                        None
                    } else {
                        Some(rng.random_range(-50..50))
                    };
                    next_id += 1;
                    (key, next_id)
                })
                .collect()
        })
        .collect()
}

fn to_batch(rows: &[Row]) -> Batch {
    Batch::try_from_arrays([
        Array::from_iter(rows.iter().map(|(key, _)| *key)),
        Array::from_iter(rows.iter().map(|(_, id)| *id)),
    ])
    .unwrap()
}

fn key_cmp(a: &Option<i64>, b: &Option<i64>, desc: bool, nulls_first: bool) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) if nulls_first => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) if nulls_first => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) if desc => b.cmp(a),
        (Some(a), Some(b)) => a.cmp(b),
    }
}

/// Stable sort of all input rows, with offset and limit applied.
fn expected(inputs: &[Vec<Row>], desc: bool, nulls_first: bool, config: &SortConfig) -> Vec<Row> {
    let mut rows: Vec<Row> = inputs.iter().flatten().copied().collect();
    rows.sort_by(|a, b| key_cmp(&a.0, &b.0, desc, nulls_first));

    rows.into_iter()
        .skip(config.offset)
        .take(config.limit.unwrap_or(usize::MAX))
        .collect()
}

fn run_sorter(
    inputs: &[Vec<Row>],
    desc: bool,
    nulls_first: bool,
    config: SortConfig,
    batch_size: usize,
) -> (Vec<Row>, SortStats) {
    let exprs = SortExpressions::new(vec![PhysicalSortExpression::new(
        PhysicalScalarExpression::column(0),
        desc,
        nulls_first,
    )]);

    let mut sorter = FullSorter::try_new(exprs, config).unwrap();
    for input in inputs {
        sorter.append_block(to_batch(input)).unwrap();
    }
    sorter.prepare_for_read().unwrap();

    let context = ExecutionContext::try_new(batch_size).unwrap();
    let mut out = Batch::empty();
    let mut rows = Vec::new();
    loop {
        out.reset_for_write();
        let eos = sorter.get_next(&context, &mut out).unwrap();

        for row_idx in 0..out.num_rows() {
            let row = out.row(row_idx).unwrap();
            let key = match &row[0] {
                ScalarValue::Null => None,
                ScalarValue::Int64(v) => Some(*v),
                other => panic!("unexpected key: {other:?}"),
            };
            let id = match &row[1] {
                ScalarValue::Int64(v) => *v,
                other => panic!("unexpected id: {other:?}"),
            };
            rows.push((key, id));
        }

        if eos {
            break;
        }
        assert!(out.num_rows() <= batch_size);
    }

    (rows, sorter.stats().clone())
}

fn config(limit: Option<usize>, offset: usize, threshold: usize, pruning: bool) -> SortConfig {
    SortConfig {
        limit,
        offset,
        buffered_rows_threshold: threshold,
        enable_topn_pruning: pruning,
    }
}

#[test]
fn full_sort_matches_oracle() {
    logutil::init_test();

    for seed in 0..20 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let inputs = generate_inputs(&mut rng, 12, 40);
        let threshold = rng.random_range(1..100);
        let batch_size = rng.random_range(1..64);
        let desc = rng.random_bool(0.5);
        let nulls_first = rng.random_bool(0.5);

        let conf = config(None, 0, threshold, true);
        let (got, stats) = run_sorter(&inputs, desc, nulls_first, conf.clone(), batch_size);

        assert_eq!(
            expected(&inputs, desc, nulls_first, &conf),
            got,
            "seed: {seed}"
        );
        assert_eq!(stats.input_rows, stats.emitted_rows, "seed: {seed}");
        assert_eq!(0, stats.pruned_batches, "seed: {seed}");
    }
}

#[test]
fn top_n_matches_oracle() {
    logutil::init_test();

    for seed in 0..40 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let inputs = generate_inputs(&mut rng, 16, 30);
        let limit = rng.random_range(0..50);
        let offset = rng.random_range(0..20);
        let threshold = rng.random_range(1..40);
        let batch_size = rng.random_range(1..32);

        let conf = config(Some(limit), offset, threshold, true);
        let (got, stats) = run_sorter(&inputs, false, false, conf.clone(), batch_size);

        assert_eq!(expected(&inputs, false, false, &conf), got, "seed: {seed}");
        assert!(got.len() <= limit, "seed: {seed}");
        assert_eq!(got.len(), stats.emitted_rows, "seed: {seed}");
    }
}

#[test]
fn pruning_is_safe() {
    logutil::init_test();

    let mut total_pruned = 0;
    for seed in 0..40 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let inputs = generate_inputs(&mut rng, 24, 20);
        let limit = rng.random_range(1..10);
        let offset = rng.random_range(0..5);
        let threshold = rng.random_range(1..10);
        let desc = rng.random_bool(0.5);

        let (pruned, stats) = run_sorter(
            &inputs,
            desc,
            false,
            config(Some(limit), offset, threshold, true),
            16,
        );
        let (unpruned, _) = run_sorter(
            &inputs,
            desc,
            false,
            config(Some(limit), offset, threshold, false),
            16,
        );

        assert_eq!(unpruned, pruned, "seed: {seed}");
        total_pruned += stats.pruned_batches;
    }

    // Small limits over many batches should discard something.
    assert!(total_pruned > 0);
}

#[test]
fn offset_skips_leading_rows() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let inputs = generate_inputs(&mut rng, 8, 25);
    let total: usize = inputs.iter().map(|rows| rows.len()).sum();

    let (all, _) = run_sorter(&inputs, false, true, config(None, 0, 16, true), 10);
    for offset in [0, 1, 5, total - 1, total, total + 3] {
        let (got, _) = run_sorter(&inputs, false, true, config(None, offset, 16, true), 10);

        assert_eq!(total.saturating_sub(offset), got.len());
        assert_eq!(&all[usize::min(offset, total)..], got.as_slice());
    }
}

#[test]
fn single_batch_matches_merge() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let inputs = generate_inputs(&mut rng, 6, 50);

    for (limit, offset) in [(None, 0), (None, 3), (Some(10), 0), (Some(7), 4)] {
        // Large threshold sorts everything as a single batch.
        let (single, single_stats) =
            run_sorter(&inputs, true, false, config(limit, offset, usize::MAX, true), 8);
        let (merged, merged_stats) =
            run_sorter(&inputs, true, false, config(limit, offset, 1, true), 8);

        assert_eq!(1, single_stats.sort_steps);
        assert!(merged_stats.sort_steps > 1);
        assert_eq!(single, merged);
    }
}
