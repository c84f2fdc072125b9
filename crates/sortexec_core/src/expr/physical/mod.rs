pub mod cast_expr;
pub mod column_expr;
pub mod literal_expr;
pub mod negate_expr;

use std::fmt;

use cast_expr::PhysicalCastExpr;
use column_expr::PhysicalColumnExpr;
use literal_expr::PhysicalLiteralExpr;
use negate_expr::PhysicalNegateExpr;
use sortexec_error::Result;

use crate::arrays::batch::Batch;
use crate::arrays::datatype::DataType;

#[derive(Debug, Clone, PartialEq)]
pub enum PhysicalScalarExpression {
    Cast(PhysicalCastExpr),
    Column(PhysicalColumnExpr),
    Literal(PhysicalLiteralExpr),
    Negate(PhysicalNegateExpr),
}

impl PhysicalScalarExpression {
    pub fn column(idx: usize) -> Self {
        Self::Column(PhysicalColumnExpr::new(idx))
    }

    pub fn cast(expr: PhysicalScalarExpression, to: DataType) -> Self {
        Self::Cast(PhysicalCastExpr {
            to,
            expr: Box::new(expr),
        })
    }

    pub fn negate(expr: PhysicalScalarExpression) -> Self {
        Self::Negate(PhysicalNegateExpr {
            expr: Box::new(expr),
        })
    }

    /// Executes the expression against a batch, returning the index of the
    /// column holding the result.
    ///
    /// Computed results (and any intermediate results) are appended to the
    /// batch as new columns. Column references resolve to the existing column
    /// without copying.
    pub fn execute(&self, batch: &mut Batch) -> Result<usize> {
        match self {
            Self::Cast(expr) => expr.execute(batch),
            Self::Column(expr) => expr.execute(batch),
            Self::Literal(expr) => expr.execute(batch),
            Self::Negate(expr) => expr.execute(batch),
        }
    }
}

impl fmt::Display for PhysicalScalarExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cast(expr) => expr.fmt(f),
            Self::Column(expr) => expr.fmt(f),
            Self::Literal(expr) => expr.fmt(f),
            Self::Negate(expr) => expr.fmt(f),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalSortExpression {
    /// Expression producing the sort key.
    pub column: PhysicalScalarExpression,
    /// If sort should be descending.
    pub desc: bool,
    /// If nulls should be ordered first.
    pub nulls_first: bool,
}

impl PhysicalSortExpression {
    pub fn new(column: PhysicalScalarExpression, desc: bool, nulls_first: bool) -> Self {
        PhysicalSortExpression {
            column,
            desc,
            nulls_first,
        }
    }

    /// Ascending, nulls last.
    pub fn asc(column: PhysicalScalarExpression) -> Self {
        Self::new(column, false, false)
    }
}

impl fmt::Display for PhysicalSortExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.column,
            if self.desc { "DESC" } else { "ASC" },
            if self.nulls_first {
                "NULLS FIRST"
            } else {
                "NULLS LAST"
            }
        )
    }
}

/// Expressions driving a sort.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SortExpressions {
    /// Ordering keys, most significant first.
    pub ordering: Vec<PhysicalSortExpression>,
    /// Expressions producing the output tuple.
    ///
    /// When set, each input batch is replaced by the results of these
    /// expressions before the ordering keys are resolved.
    pub materialize: Option<Vec<PhysicalScalarExpression>>,
}

impl SortExpressions {
    pub fn new(ordering: Vec<PhysicalSortExpression>) -> Self {
        SortExpressions {
            ordering,
            materialize: None,
        }
    }

    pub fn with_materialize(mut self, exprs: Vec<PhysicalScalarExpression>) -> Self {
        self.materialize = Some(exprs);
        self
    }
}
