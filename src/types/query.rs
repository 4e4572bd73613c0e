//! Shared query-execution types

use super::expression::Expression;
use super::value::Row;
use crate::error::Result;

/// A fallible stream of rows. Operators that can stream stay lazy by
/// chaining these; blocking operators (sort, aggregate, window, join build
/// side) collect them.
pub type Rows<'a> = Box<dyn Iterator<Item = Result<Row>> + 'a>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    Left,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Ascending,
    Descending,
}

/// Where nulls sort relative to non-null values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NullOrder {
    #[default]
    NullsFirst,
    NullsLast,
}

/// One key of a sort or window ordering.
#[derive(Clone, Debug, PartialEq)]
pub struct SortKey {
    pub expr: Expression,
    pub direction: Direction,
    pub nulls: NullOrder,
}

impl SortKey {
    pub fn asc(expr: Expression) -> Self {
        Self { expr, direction: Direction::Ascending, nulls: NullOrder::default() }
    }

    pub fn desc(expr: Expression) -> Self {
        Self { expr, direction: Direction::Descending, nulls: NullOrder::default() }
    }

    pub fn with_nulls(mut self, nulls: NullOrder) -> Self {
        self.nulls = nulls;
        self
    }
}
