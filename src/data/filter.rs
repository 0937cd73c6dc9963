use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::model::{Row, Table, Value};
use crate::error::ChartError;

// ---------------------------------------------------------------------------
// Filter predicate: fixed parameter values for one chart
// ---------------------------------------------------------------------------

/// Equality constraints, column → required value. A row passes when every
/// constrained column matches (see [`Value::matches`]).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterPredicate(BTreeMap<String, Value>);

impl FilterPredicate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The constrained columns and their required values.
    pub fn constraints(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(c, v)| (c.as_str(), v))
    }

    pub fn accepts(&self, row: &Row) -> bool {
        self.0
            .iter()
            .all(|(column, wanted)| row.get(column).matches(wanted))
    }

    /// Return the rows of `table` that pass, in their original order.
    ///
    /// Fails when a constrained column does not exist in the table at all,
    /// since such a filter can only ever select nothing by accident.
    pub fn apply(&self, table: &Table) -> Result<Table, ChartError> {
        if let Some(column) = self.0.keys().find(|c| !table.has_column(c)) {
            return Err(ChartError::UnknownColumn {
                column: column.clone(),
            });
        }
        let rows = table
            .rows()
            .iter()
            .filter(|row| self.accepts(row))
            .cloned()
            .collect();
        Ok(Table::from_rows(table.columns().to_vec(), rows))
    }
}
