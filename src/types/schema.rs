//! Table schemas and name resolution

use super::data_type::DataType;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A named, typed column.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub datatype: DataType,
}

impl Column {
    pub fn new(name: impl Into<String>, datatype: DataType) -> Self {
        Self { name: name.into(), datatype }
    }

    /// The unqualified part of the column name (`o.total` -> `total`).
    pub fn short_name(&self) -> &str {
        match self.name.rsplit('.').next() {
            Some(s) => s,
            None => &self.name,
        }
    }
}

/// An ordered list of columns with unique names.
///
/// Resolution of a column reference tries an exact name match first. An
/// unqualified reference may also match the suffix of a qualified column
/// (`total` resolves to `o.total`); more than one suffix match is ambiguous.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        for (i, col) in columns.iter().enumerate() {
            if col.name.is_empty() {
                return Err(Error::ExecutionError("Empty column name".into()));
            }
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(Error::DuplicateColumn(col.name.clone()));
            }
        }
        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column(&self, index: usize) -> &Column {
        &self.columns[index]
    }

    /// Resolves a column reference to its index, or `UnknownColumn`.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        match self.try_index_of(name)? {
            Some(i) => Ok(i),
            None => Err(Error::UnknownColumn(name.into())),
        }
    }

    /// Resolves a column reference, returning `None` when absent. Used by
    /// scope chains that fall through to an outer row before failing.
    pub fn try_index_of(&self, name: &str) -> Result<Option<usize>> {
        if let Some(i) = self.columns.iter().position(|c| c.name == name) {
            return Ok(Some(i));
        }
        // Qualified references must match exactly
        if name.contains('.') {
            return Ok(None);
        }
        let mut found = None;
        for (i, col) in self.columns.iter().enumerate() {
            if col.name.contains('.') && col.short_name() == name {
                if found.is_some() {
                    return Err(Error::AmbiguousColumn(name.into()));
                }
                found = Some(i);
            }
        }
        Ok(found)
    }

    /// Returns a copy of this schema with every column qualified by `alias`.
    pub fn qualify(&self, alias: &str) -> Result<Schema> {
        Schema::new(
            self.columns
                .iter()
                .map(|c| Column::new(format!("{}.{}", alias, c.short_name()), c.datatype))
                .collect(),
        )
    }

    /// Concatenates two schemas for a join. Duplicate names are rejected,
    /// which forces self-joins to alias both sides.
    pub fn join(&self, other: &Schema) -> Result<Schema> {
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());
        Schema::new(columns)
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} {}", col.name, col.datatype)?;
        }
        write!(f, ")")
    }
}
