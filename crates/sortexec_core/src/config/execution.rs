use sortexec_error::{DbError, Result};

pub const DEFAULT_BATCH_SIZE: usize = 4096;

const MIN_BATCH_SIZE: usize = 1;

/// Per-call execution state handed to operators when pulling output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionContext {
    batch_size: usize,
}

impl ExecutionContext {
    pub fn try_new(batch_size: usize) -> Result<Self> {
        if batch_size < MIN_BATCH_SIZE {
            return Err(DbError::new(format!(
                "Batch size cannot be less than {MIN_BATCH_SIZE}"
            )));
        }
        Ok(ExecutionContext { batch_size })
    }

    /// Desired number of rows in an output batch.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl Default for ExecutionContext {
    fn default() -> Self {
        ExecutionContext {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_batch_size() {
        ExecutionContext::try_new(0).unwrap_err();
        assert_eq!(1, ExecutionContext::try_new(1).unwrap().batch_size());
    }
}
