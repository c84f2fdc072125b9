use std::fmt;

use sortexec_error::{DbError, Result};

use super::PhysicalScalarExpression;
use crate::arrays::array::{Array, ArrayData};
use crate::arrays::batch::Batch;

/// Arithmetic negation of a numeric expression.
///
/// Integer overflow (negating the minimum value) is an error.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalNegateExpr {
    pub expr: Box<PhysicalScalarExpression>,
}

impl PhysicalNegateExpr {
    pub fn execute(&self, batch: &mut Batch) -> Result<usize> {
        let input_idx = self.expr.execute(batch)?;
        let input = batch.array(input_idx)?;

        let overflow = || DbError::new("Integer overflow in negation");

        // Null slots hold zero so they never overflow.
        let data = match input.data() {
            ArrayData::Int32(v) => ArrayData::Int32(
                v.iter()
                    .map(|v| v.checked_neg().ok_or_else(overflow))
                    .collect::<Result<_>>()?,
            ),
            ArrayData::Int64(v) => ArrayData::Int64(
                v.iter()
                    .map(|v| v.checked_neg().ok_or_else(overflow))
                    .collect::<Result<_>>()?,
            ),
            ArrayData::Float64(v) => ArrayData::Float64(v.iter().map(|v| -v).collect()),
            _ => {
                return Err(DbError::new("Cannot negate non-numeric value")
                    .with_field("datatype", input.datatype()));
            }
        };

        let output = Array {
            datatype: input.datatype(),
            validity: input.validity.clone(),
            data,
        };

        batch.push_array(output)
    }
}

impl fmt::Display for PhysicalNegateExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "-({})", self.expr)
    }
}
