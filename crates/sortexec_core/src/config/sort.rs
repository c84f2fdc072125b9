use serde::{Deserialize, Serialize};
use sortexec_error::{DbError, Result};

/// Number of buffered input rows that triggers a sort of the buffered rows.
pub const DEFAULT_BUFFERED_ROWS_THRESHOLD: usize = 1024 * 1024;

/// Configuration for a single sort operator instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Maximum number of rows to emit, None for a full sort.
    pub limit: Option<usize>,
    /// Number of leading rows to skip before emitting.
    pub offset: usize,
    /// Buffered row count at which buffered input gets sorted and admitted.
    pub buffered_rows_threshold: usize,
    /// If sorted batches that can't contribute to a bounded result should be
    /// discarded early.
    ///
    /// Has no effect without a limit.
    pub enable_topn_pruning: bool,
}

impl SortConfig {
    pub fn validate(&self) -> Result<()> {
        if self.buffered_rows_threshold == 0 {
            return Err(DbError::new("Buffered rows threshold must be greater than zero"));
        }
        Ok(())
    }

    /// Number of rows that need to be retained to produce the output, None
    /// if every row is needed.
    pub fn retain_bound(&self) -> Option<usize> {
        self.limit.map(|limit| limit.saturating_add(self.offset))
    }
}

impl Default for SortConfig {
    fn default() -> Self {
        SortConfig {
            limit: None,
            offset: 0,
            buffered_rows_threshold: DEFAULT_BUFFERED_ROWS_THRESHOLD,
            enable_topn_pruning: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retain_bound_includes_offset() {
        let conf = SortConfig {
            limit: Some(4),
            offset: 1,
            ..Default::default()
        };
        assert_eq!(Some(5), conf.retain_bound());
        assert_eq!(None, SortConfig::default().retain_bound());
    }

    #[test]
    fn zero_threshold_invalid() {
        let conf = SortConfig {
            buffered_rows_threshold: 0,
            ..Default::default()
        };
        conf.validate().unwrap_err();
    }
}
