use std::fmt;

use sortexec_error::Result;

use super::PhysicalScalarExpression;
use crate::arrays::array::Array;
use crate::arrays::batch::Batch;
use crate::arrays::datatype::DataType;

#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalCastExpr {
    pub to: DataType,
    pub expr: Box<PhysicalScalarExpression>,
}

impl PhysicalCastExpr {
    pub fn execute(&self, batch: &mut Batch) -> Result<usize> {
        let input_idx = self.expr.execute(batch)?;
        let input = batch.array(input_idx)?;
        if input.datatype() == self.to {
            return Ok(input_idx);
        }

        let mut output = Array::with_capacity(self.to, input.len());
        for row in 0..input.len() {
            let value = input.get_value(row)?.try_cast(self.to)?;
            output.push_value(&value)?;
        }

        batch.push_array(output)
    }
}

impl fmt::Display for PhysicalCastExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CAST({} TO {})", self.expr, self.to)
    }
}
