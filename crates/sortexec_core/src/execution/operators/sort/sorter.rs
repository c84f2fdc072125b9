use sortexec_error::Result;

use crate::arrays::batch::Batch;
use crate::arrays::sort::sort_batch::sort_batch;
use crate::arrays::sort::sort_description::{SortColumnDescription, SortDescription};
use crate::expr::physical::SortExpressions;

/// Sorts individual batches ahead of merging.
#[derive(Debug)]
pub struct Sorter {
    exprs: SortExpressions,
    limit: Option<usize>,
    offset: usize,
    /// Description resolved by the most recent call to `partial_sort`.
    sort_description: SortDescription,
}

impl Sorter {
    pub fn new(exprs: SortExpressions, limit: Option<usize>, offset: usize) -> Self {
        Sorter {
            exprs,
            limit,
            offset,
            sort_description: SortDescription::default(),
        }
    }

    pub fn sort_description(&self) -> &SortDescription {
        &self.sort_description
    }

    /// Sort a batch in place, returning the number of leading columns that
    /// make up the output.
    ///
    /// If the output tuple needs to be materialized, the batch is replaced
    /// with the materialized columns first. Sort keys that aren't plain column
    /// references are computed and appended after the output columns.
    ///
    /// With a limit, only the first `offset + limit` rows are kept.
    pub fn partial_sort(&mut self, batch: &mut Batch) -> Result<usize> {
        if let Some(materialize) = &self.exprs.materialize {
            let mut columns = Vec::with_capacity(materialize.len());
            for expr in materialize {
                columns.push(expr.execute(batch)?);
            }
            batch.project(&columns)?;
        }
        let num_output_columns = batch.num_columns();

        let mut columns = Vec::with_capacity(self.exprs.ordering.len());
        for expr in &self.exprs.ordering {
            let column_idx = expr.column.execute(batch)?;
            columns.push(SortColumnDescription::new(
                column_idx,
                expr.desc,
                expr.nulls_first,
            ));
        }
        self.sort_description = SortDescription::new(columns);

        let bound = self.limit.map(|limit| limit.saturating_add(self.offset));
        sort_batch(batch, &self.sort_description, bound)?;

        Ok(num_output_columns)
    }
}
