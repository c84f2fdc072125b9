use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use clap::{ArgAction, Parser, ValueEnum};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use sortexec_core::arrays::array::Array;
use sortexec_core::arrays::batch::Batch;
use sortexec_core::arrays::sort::sort_description::{SortColumnDescription, SortDescription};
use sortexec_core::config::execution::{DEFAULT_BATCH_SIZE, ExecutionContext};
use sortexec_core::config::sort::SortConfig;
use sortexec_core::execution::operators::sort::full_sorter::{FullSorter, SortStats};
use sortexec_core::expr::physical::{
    PhysicalScalarExpression,
    PhysicalSortExpression,
    SortExpressions,
};
use sortexec_error::{DbError, Result, ResultExt};
use tracing::{Level, info};

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum LogFormatArg {
    #[default]
    Pretty,
    Json,
}

impl From<LogFormatArg> for logutil::LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => logutil::LogFormat::HumanReadable,
            LogFormatArg::Json => logutil::LogFormat::Json,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(name = "sortexec_bench")]
#[clap(about = "Sort randomly generated batches and report what the sorter did", long_about = None)]
struct Arguments {
    /// Total number of rows to generate.
    #[clap(long, env = "SORTEXEC_ROWS", default_value_t = 1_000_000)]
    rows: usize,

    /// Rows per generated input batch.
    #[clap(long, default_value_t = 8192)]
    input_batch_size: usize,

    /// Rows per output batch.
    #[clap(long, default_value_t = DEFAULT_BATCH_SIZE)]
    output_batch_size: usize,

    /// Only produce this many rows.
    #[clap(long)]
    limit: Option<usize>,

    /// Skip this many leading rows.
    #[clap(long)]
    offset: Option<usize>,

    /// Buffered row count that triggers sorting.
    #[clap(long)]
    threshold: Option<usize>,

    /// Retain every sorted batch even when a limit is set.
    #[clap(long)]
    disable_pruning: bool,

    /// JSON file containing a sort config. Flags override values from the
    /// file.
    #[clap(long, env = "SORTEXEC_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for data generation.
    #[clap(long, default_value_t = 0)]
    seed: u64,

    /// Sort descending.
    #[clap(long)]
    desc: bool,

    /// Order nulls before non-null values.
    #[clap(long)]
    nulls_first: bool,

    /// Fraction of keys that are null.
    #[clap(long, default_value_t = 0.05)]
    null_fraction: f64,

    /// Log verbosity.
    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,

    #[clap(long, value_enum, default_value_t)]
    log_format: LogFormatArg,
}

#[derive(Debug, Serialize)]
struct Summary {
    config: SortConfig,
    input_rows: usize,
    output_rows: usize,
    output_batches: usize,
    elapsed_ms: f64,
    stats: SortStats,
}

fn main() -> Result<()> {
    let args = Arguments::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    logutil::configure_global_logger(level, args.log_format.into(), std::io::stderr);

    let config = resolve_config(&args)?;
    info!(?config, rows = args.rows, seed = args.seed, "starting sort");

    let inputs = generate_batches(&args)?;
    let summary = run(&args, config, inputs)?;

    let out = serde_json::to_string_pretty(&summary).context("failed to serialize summary")?;
    println!("{out}");

    Ok(())
}

fn resolve_config(args: &Arguments) -> Result<SortConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let file = File::open(path)
                .context_fn(|| format!("failed to open config file '{}'", path.display()))?;
            serde_json::from_reader(file).context("failed to parse sort config")?
        }
        None => SortConfig::default(),
    };

    if args.limit.is_some() {
        config.limit = args.limit;
    }
    if let Some(offset) = args.offset {
        config.offset = offset;
    }
    if let Some(threshold) = args.threshold {
        config.buffered_rows_threshold = threshold;
    }
    if args.disable_pruning {
        config.enable_topn_pruning = false;
    }

    config.validate()?;
    Ok(config)
}

/// Generate input batches with a nullable Int64 key and a Float64 payload.
fn generate_batches(args: &Arguments) -> Result<Vec<Batch>> {
    if args.input_batch_size == 0 {
        return Err(DbError::new("Input batch size must be greater than zero"));
    }
    if !(0.0..=1.0).contains(&args.null_fraction) {
        return Err(DbError::new("Null fraction must be between 0 and 1")
            .with_field("null_fraction", args.null_fraction));
    }

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let mut batches = Vec::with_capacity(args.rows.div_ceil(args.input_batch_size));

    let mut remaining = args.rows;
    while remaining > 0 {
        let len = usize::min(remaining, args.input_batch_size);
        remaining -= len;

        let keys: Vec<Option<i64>> = (0..len)
            .map(|_| {
                if rng.random_bool(args.null_fraction) {
                    None
                } else {
                    Some(rng.random_range(-1_000_000..1_000_000))
                }
            })
            .collect();
        let payload: Vec<f64> = (0..len).map(|_| rng.random()).collect();

        batches.push(Batch::try_from_arrays([
            Array::from_iter(keys),
            Array::from_iter(payload),
        ])?);
    }

    Ok(batches)
}

fn run(args: &Arguments, config: SortConfig, inputs: Vec<Batch>) -> Result<Summary> {
    let exprs = SortExpressions::new(vec![PhysicalSortExpression::new(
        PhysicalScalarExpression::column(0),
        args.desc,
        args.nulls_first,
    )]);
    let context = ExecutionContext::try_new(args.output_batch_size)?;
    let mut sorter = FullSorter::try_new(exprs, config.clone())?;

    let start = Instant::now();

    for input in inputs {
        sorter.append_block(input)?;
    }
    sorter.prepare_for_read()?;

    let verify = SortDescription::new([SortColumnDescription::new(
        0,
        args.desc,
        args.nulls_first,
    )]);
    let mut checker = OrderChecker::new(verify);

    let mut out = Batch::empty();
    let mut output_batches = 0;
    loop {
        out.reset_for_write();
        let eos = sorter.get_next(&context, &mut out)?;
        if out.num_rows() > 0 {
            output_batches += 1;
            checker.check(&out)?;
        }
        if eos {
            break;
        }
    }

    let elapsed = start.elapsed();

    let expected_rows = {
        let available = args.rows.saturating_sub(config.offset);
        match config.limit {
            Some(limit) => usize::min(limit, available),
            None => available,
        }
    };
    if checker.rows != expected_rows {
        return Err(DbError::new("Sorter produced an unexpected number of rows")
            .with_field("expected", expected_rows)
            .with_field("got", checker.rows));
    }

    info!(rows = checker.rows, ?elapsed, "sort complete");

    Ok(Summary {
        input_rows: args.rows,
        output_rows: checker.rows,
        output_batches,
        elapsed_ms: elapsed.as_secs_f64() * 1000.0,
        stats: sorter.stats().clone(),
        config,
    })
}

/// Checks that rows across all output batches are in order.
#[derive(Debug)]
struct OrderChecker {
    desc: SortDescription,
    /// Last row of the previous batch.
    prev: Option<Batch>,
    rows: usize,
}

impl OrderChecker {
    fn new(desc: SortDescription) -> Self {
        OrderChecker {
            desc,
            prev: None,
            rows: 0,
        }
    }

    fn check(&mut self, batch: &Batch) -> Result<()> {
        if let Some(prev) = &self.prev {
            self.check_pair(prev, 0, batch, 0)?;
        }
        for row in 1..batch.num_rows() {
            self.check_pair(batch, row - 1, batch, row)?;
        }

        let mut last = Batch::new(batch.datatypes(), 1);
        last.append_row_from(batch, batch.num_rows() - 1, batch.num_columns())?;
        self.prev = Some(last);
        self.rows += batch.num_rows();

        Ok(())
    }

    fn check_pair(&self, a: &Batch, a_row: usize, b: &Batch, b_row: usize) -> Result<()> {
        if self.desc.compare_rows(a, a_row, b, b_row).is_gt() {
            return Err(DbError::new("Output rows out of order")
                .with_field("output_row", self.rows + b_row));
        }
        Ok(())
    }
}
