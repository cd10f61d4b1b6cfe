//! Record filters.
//!
//! A filter is a boolean expression over the fields of one record. The
//! same filter drives `list` results and live-query membership, so its
//! evaluation must be a pure function of the record.

use brewline_core::{Record, RecordId, Value};
use std::cmp::Ordering;

use crate::{QueryError, QueryResult};

/// A filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals value. `Eq(f, Null)` matches records without `f`.
    Eq(String, Value),
    Ne(String, Value),
    Gt(String, Value),
    Ge(String, Value),
    Lt(String, Value),
    Le(String, Value),
    /// Inclusive range.
    Between(String, Value, Value),
    /// Substring of a string field, or member of a list field.
    Contains(String, Value),
    NotContains(String, Value),
    BeginsWith(String, String),
    /// Field presence (`true`) or absence (`false`).
    Exists(String, bool),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Eq(field.into(), value.into())
    }

    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Ne(field.into(), value.into())
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Gt(field.into(), value.into())
    }

    pub fn ge(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Ge(field.into(), value.into())
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Lt(field.into(), value.into())
    }

    pub fn le(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Le(field.into(), value.into())
    }

    pub fn between(field: impl Into<String>, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        Filter::Between(field.into(), low.into(), high.into())
    }

    pub fn contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Contains(field.into(), value.into())
    }

    pub fn not_contains(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::NotContains(field.into(), value.into())
    }

    pub fn begins_with(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Filter::BeginsWith(field.into(), prefix.into())
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Filter::Exists(field.into(), true)
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Filter::Exists(field.into(), false)
    }

    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::And(filters.into_iter().collect())
    }

    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Or(filters.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(filter: Filter) -> Self {
        Filter::Not(Box::new(filter))
    }

    /// Every field name the filter reads.
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_fields(&mut out);
        out
    }

    fn collect_fields<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Filter::Eq(f, _)
            | Filter::Ne(f, _)
            | Filter::Gt(f, _)
            | Filter::Ge(f, _)
            | Filter::Lt(f, _)
            | Filter::Le(f, _)
            | Filter::Between(f, _, _)
            | Filter::Contains(f, _)
            | Filter::NotContains(f, _)
            | Filter::BeginsWith(f, _)
            | Filter::Exists(f, _) => out.push(f),
            Filter::And(items) | Filter::Or(items) => {
                for item in items {
                    item.collect_fields(out);
                }
            }
            Filter::Not(inner) => inner.collect_fields(out),
        }
    }

    /// Reference equalities every match must satisfy, in filter order. Only
    /// the top level and nested `And`s are searched. Used to pick a
    /// foreign-key index.
    pub fn pinned_references(&self) -> Vec<(&str, RecordId)> {
        let mut out = Vec::new();
        self.collect_pinned(&mut out);
        out
    }

    fn collect_pinned<'a>(&'a self, out: &mut Vec<(&'a str, RecordId)>) {
        match self {
            Filter::Eq(field, value) => {
                if let Some(id) = value.as_id() {
                    out.push((field.as_str(), RecordId::from(id)));
                }
            }
            Filter::And(items) => {
                for item in items {
                    item.collect_pinned(out);
                }
            }
            _ => {}
        }
    }

    /// Evaluate the filter against a record.
    pub fn matches(&self, record: &Record) -> QueryResult<bool> {
        match self {
            Filter::Eq(field, expected) => Ok(eq(record, field, expected)),
            Filter::Ne(field, expected) => Ok(!eq(record, field, expected)),
            Filter::Gt(field, bound) => ordered(record, field, bound, Ordering::is_gt),
            Filter::Ge(field, bound) => ordered(record, field, bound, Ordering::is_ge),
            Filter::Lt(field, bound) => ordered(record, field, bound, Ordering::is_lt),
            Filter::Le(field, bound) => ordered(record, field, bound, Ordering::is_le),
            Filter::Between(field, low, high) => Ok(ordered(record, field, low, Ordering::is_ge)?
                && ordered(record, field, high, Ordering::is_le)?),
            Filter::Contains(field, needle) => contains(record, field, needle),
            Filter::NotContains(field, needle) => {
                // Absent fields contain nothing.
                if record.lookup(field).is_none() {
                    return Ok(true);
                }
                contains(record, field, needle).map(|found| !found)
            }
            Filter::BeginsWith(field, prefix) => match record.lookup(field) {
                None => Ok(false),
                Some(value) => match value.as_id() {
                    Some(text) => Ok(text.starts_with(prefix.as_str())),
                    None => Err(QueryError::incomparable(field, value.type_name(), "String")),
                },
            },
            Filter::Exists(field, present) => Ok(record.lookup(field).is_some() == *present),
            Filter::And(items) => {
                for item in items {
                    if !item.matches(record)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Filter::Or(items) => {
                for item in items {
                    if item.matches(record)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Filter::Not(inner) => inner.matches(record).map(|m| !m),
        }
    }
}

fn eq(record: &Record, field: &str, expected: &Value) -> bool {
    match record.lookup(field) {
        None => expected.is_null(),
        Some(actual) => actual.loose_eq(expected),
    }
}

/// Absent fields never satisfy an ordering; present but incomparable
/// values are an error.
fn ordered(
    record: &Record,
    field: &str,
    bound: &Value,
    accept: fn(Ordering) -> bool,
) -> QueryResult<bool> {
    let Some(actual) = record.lookup(field) else {
        return Ok(false);
    };
    actual
        .compare(bound)
        .map(accept)
        .ok_or_else(|| QueryError::incomparable(field, actual.type_name(), bound.type_name()))
}

fn contains(record: &Record, field: &str, needle: &Value) -> QueryResult<bool> {
    match record.lookup(field) {
        None => Ok(false),
        Some(Value::List(items)) => Ok(items.iter().any(|item| item.loose_eq(needle))),
        Some(Value::String(haystack)) => match needle.as_str() {
            Some(n) => Ok(haystack.contains(n)),
            None => Err(QueryError::incomparable(field, "String", needle.type_name())),
        },
        Some(other) => Err(QueryError::incomparable(field, other.type_name(), needle.type_name())),
    }
}
