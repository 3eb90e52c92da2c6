//! Typed read queries and result rows
//!
//! A [`ReadQuery`] declares the columns it expects. Sessions decode every row
//! against that declaration, so a missing or ill-typed column surfaces as
//! [`QueryError::Decode`] at the query boundary.

use crate::error::QueryError;
use graphschema_core::model::ElementId;
use std::collections::HashMap;

/// Type of a declared result column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Bool,
    String,
    StringList,
}

/// A declared result column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

/// A read-only Cypher query with string parameters and declared result columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadQuery {
    cypher: String,
    params: Vec<(String, String)>,
    columns: Vec<ColumnSpec>,
}

impl ReadQuery {
    pub fn new(cypher: impl Into<String>) -> Self {
        Self {
            cypher: cypher.into(),
            params: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Bind a string parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Declare an expected result column
    pub fn column(mut self, name: impl Into<String>, kind: ColumnKind) -> Self {
        self.columns.push(ColumnSpec {
            name: name.into(),
            kind,
        });
        self
    }

    pub fn cypher(&self) -> &str {
        &self.cypher
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }
}

/// A decoded column value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Bool(bool),
    String(String),
    StringList(Vec<String>),
}

/// A decoded result row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: HashMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly used to script mock responses
    pub fn with(mut self, column: impl Into<String>, value: Value) -> Self {
        self.values.insert(column.into(), value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        self.values.insert(column.into(), value);
    }

    fn value(&self, column: &str) -> Result<&Value, QueryError> {
        self.values
            .get(column)
            .ok_or_else(|| QueryError::decode(column, "column missing from result row"))
    }

    /// Read a boolean column, `None` when the value is null
    pub fn get_bool(&self, column: &str) -> Result<Option<bool>, QueryError> {
        match self.value(column)? {
            Value::Bool(b) => Ok(Some(*b)),
            Value::Null => Ok(None),
            other => Err(QueryError::decode(
                column,
                format!("expected boolean, got {other:?}"),
            )),
        }
    }

    /// Read a string column, `None` when the value is null
    pub fn get_string(&self, column: &str) -> Result<Option<String>, QueryError> {
        match self.value(column)? {
            Value::String(s) => Ok(Some(s.clone())),
            Value::Null => Ok(None),
            other => Err(QueryError::decode(
                column,
                format!("expected string, got {other:?}"),
            )),
        }
    }

    /// Read a string-list column, empty when the value is null
    pub fn get_string_list(&self, column: &str) -> Result<Vec<String>, QueryError> {
        match self.value(column)? {
            Value::StringList(items) => Ok(items.clone()),
            Value::Null => Ok(Vec::new()),
            other => Err(QueryError::decode(
                column,
                format!("expected list of strings, got {other:?}"),
            )),
        }
    }
}

/// A node as returned by `db.schema.visualization()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawNode {
    pub id: ElementId,
    pub labels: Vec<String>,
    pub name: Option<String>,
}

/// A relationship as returned by `db.schema.visualization()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRelationship {
    pub id: ElementId,
    pub start_id: ElementId,
    pub end_id: ElementId,
    pub rel_type: String,
}

/// Undecoded topology graph
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawGraph {
    pub nodes: Vec<RawNode>,
    pub relationships: Vec<RawRelationship>,
}
