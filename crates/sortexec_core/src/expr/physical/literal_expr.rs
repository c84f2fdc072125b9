use std::fmt;

use sortexec_error::{OptionExt, Result};

use crate::arrays::array::Array;
use crate::arrays::batch::Batch;
use crate::arrays::datatype::DataType;
use crate::arrays::scalar::ScalarValue;

#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalLiteralExpr {
    pub literal: ScalarValue,
    pub datatype: DataType,
}

impl PhysicalLiteralExpr {
    /// Create a literal expression, inferring the type from the value.
    ///
    /// Errors on untyped nulls, use `new_null` for those.
    pub fn try_new(literal: impl Into<ScalarValue>) -> Result<Self> {
        let literal = literal.into();
        let datatype = literal.datatype().required("datatype for literal")?;
        Ok(PhysicalLiteralExpr { literal, datatype })
    }

    pub fn new_null(datatype: DataType) -> Self {
        PhysicalLiteralExpr {
            literal: ScalarValue::Null,
            datatype,
        }
    }

    /// Append a column repeating the literal for every row in the batch.
    pub fn execute(&self, batch: &mut Batch) -> Result<usize> {
        let array = Array::new_repeated(self.datatype, &self.literal, batch.num_rows())?;
        batch.push_array(array)
    }
}

impl fmt::Display for PhysicalLiteralExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.literal)
    }
}
