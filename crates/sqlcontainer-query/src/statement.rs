//! Statement accumulator
//!
//! Collects the parameter values in the same left-to-right order as the
//! `?` placeholders the compiler emits.

use sqlcontainer_core::{Value, ValueType};

/// SQL text plus the ordered values for its placeholders
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatementHelper {
    query_string: String,
    parameters: Vec<Value>,
}

impl StatementHelper {
    pub fn new() -> Self {
        Self::default()
    }

    /// The SQL text, empty until a generator sets it
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    pub fn set_query_string(&mut self, query: impl Into<String>) {
        self.query_string = query.into();
    }

    /// Append the value for the next placeholder
    pub fn add_parameter(&mut self, value: impl Into<Value>) {
        self.parameters.push(value.into());
    }

    /// Append a NULL the driver should bind as `value_type`
    pub fn add_typed_null(&mut self, value_type: ValueType) {
        self.parameters.push(Value::TypedNull(value_type));
    }

    pub fn parameters(&self) -> &[Value] {
        &self.parameters
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    /// Number of `?` placeholders in the query string
    pub fn placeholder_count(&self) -> usize {
        self.query_string.matches('?').count()
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.query_string, self.parameters)
    }
}
