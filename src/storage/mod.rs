//! The row store
//!
//! Tables are immutable after load and column-oriented internally: one value
//! vector per column, rows re-assembled on scan. Scans are restartable;
//! every call to `scan` is an independent full pass in insertion order, so
//! concurrent read-only executions over shared tables need no
//! synchronization.

use crate::error::{Error, Result};
use crate::types::{Row, Schema, Value};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    name: String,
    schema: Schema,
    columns: Vec<Vec<Value>>,
    row_count: usize,
}

impl Table {
    /// Builds a table from rows, validating every row against the schema.
    ///
    /// A row with the wrong arity, or a non-null value whose type disagrees
    /// with its column, fails the whole load with `SchemaMismatch`. Nulls
    /// are legal in every column.
    pub fn load(name: impl Into<String>, schema: Schema, rows: Vec<Row>) -> Result<Table> {
        let name = name.into();
        let row_count = rows.len();
        let mut columns: Vec<Vec<Value>> = (0..schema.len()).map(|_| Vec::new()).collect();
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != schema.len() {
                return Err(Error::SchemaMismatch {
                    table: name,
                    reason: format!(
                        "row {} has {} values, schema has {} columns",
                        i,
                        row.len(),
                        schema.len()
                    ),
                });
            }
            for (j, value) in row.into_iter().enumerate() {
                let column = schema.column(j);
                if let Err(e) = value.check_type(&column.datatype) {
                    return Err(Error::SchemaMismatch {
                        table: name,
                        reason: format!("row {}, column {}: {}", i, column.name, e),
                    });
                }
                columns[j].push(value);
            }
        }
        Ok(Table { name, schema, columns, row_count })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Re-assembles the row at `index` from the column vectors.
    pub fn row(&self, index: usize) -> Row {
        self.columns.iter().map(|col| col[index].clone()).collect()
    }

    /// A full pass over the table in insertion order. Each call returns an
    /// independent iterator; there is no shared cursor.
    pub fn scan(&self) -> impl Iterator<Item = Row> + '_ {
        (0..self.row_count).map(|i| self.row(i))
    }

    /// All rows, materialized. Mostly useful for result inspection.
    pub fn rows(&self) -> Vec<Row> {
        self.scan().collect()
    }
}

/// The engine's table namespace.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: HashMap<String, Table>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, table: Table) -> Result<()> {
        if self.tables.contains_key(table.name()) {
            return Err(Error::DuplicateTable(table.name().into()));
        }
        self.tables.insert(table.name().to_string(), table);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::TableNotFound(name.into()))
    }
}
