use std::collections::BTreeMap;

use serde_json::{Map, Value as JsonValue};

use crate::types::RowValues;

/// Ordered parameter values produced by resolution and consumed by execution.
///
/// Position `i` (1-based) binds to placeholder `@PARAM_<i>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreparedStatementContext {
    values: Vec<RowValues>,
}

impl PreparedStatementContext {
    pub(crate) fn reset(&mut self) {
        self.values.clear();
    }

    pub(crate) fn replace(&mut self, values: Vec<RowValues>) {
        self.values = values;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value bound to `@PARAM_<position>`.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&RowValues> {
        position.checked_sub(1).and_then(|idx| self.values.get(idx))
    }

    #[must_use]
    pub fn as_slice(&self) -> &[RowValues] {
        &self.values
    }
}

/// Variables supplied by the host, optional file attachments, and the
/// prepared-statement slot written by the resolver.
#[derive(Debug, Clone, Default)]
pub struct RuntimeContext {
    variables: Map<String, JsonValue>,
    files: BTreeMap<String, String>,
    prepared: PreparedStatementContext,
}

impl RuntimeContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a context from a JSON object; any other JSON value yields an empty context.
    #[must_use]
    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Object(variables) => Self {
                variables,
                ..Self::default()
            },
            _ => Self::default(),
        }
    }

    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: JsonValue) -> Self {
        self.variables.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn with_file(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.insert(name.into(), content.into());
        self
    }

    #[must_use]
    pub fn variable(&self, name: &str) -> Option<&JsonValue> {
        self.variables.get(name)
    }

    #[must_use]
    pub fn file(&self, name: &str) -> Option<&str> {
        self.files.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn prepared(&self) -> &PreparedStatementContext {
        &self.prepared
    }

    pub(crate) fn prepared_mut(&mut self) -> &mut PreparedStatementContext {
        &mut self.prepared
    }
}
