//! Column schema for outline tables.
//!
//! This module provides:
//! - [`ColumnDef`] - A named column with its value kind and capability tags
//! - [`Schema`] - The ordered column list of a table with optional lookups

use crate::value::ValueKind;
use serde::{Deserialize, Serialize};

// ============================================================================
// Column Definition
// ============================================================================

/// Definition of a single attribute column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Kind of the non-null values in the column.
    pub kind: ValueKind,
    /// Whether the column holds labels from a finite label space.
    #[serde(default)]
    pub categorical: bool,
}

impl ColumnDef {
    /// Create a non-categorical column.
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
            categorical: false,
        }
    }

    /// Mark this column as categorical.
    pub fn categorical(mut self) -> Self {
        self.categorical = true;
        self
    }
}

// ============================================================================
// Schema
// ============================================================================

/// Ordered set of columns.
///
/// Lookups return `Option` so that absent columns are ordinary control flow:
/// every cleaning stage whose column is missing simply passes rows through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    columns: Vec<ColumnDef>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a schema from column definitions.
    ///
    /// Later definitions with a name already seen are ignored.
    pub fn from_columns(columns: impl IntoIterator<Item = ColumnDef>) -> Self {
        let mut schema = Self::new();
        for column in columns {
            schema.push(column);
        }
        schema
    }

    /// Append a column, returning its position.
    ///
    /// If a column with the same name exists its position is returned unchanged.
    pub fn push(&mut self, column: ColumnDef) -> usize {
        if let Some(pos) = self.position(&column.name) {
            return pos;
        }
        self.columns.push(column);
        self.columns.len() - 1
    }

    /// Position of the named column.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Definition of the named column.
    pub fn get(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Mutable definition of the named column.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut ColumnDef> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    /// Check whether the named column exists.
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Column definitions in order.
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [ColumnDef] {
        &mut self.columns
    }

    /// Column names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
