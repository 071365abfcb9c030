//! Store-neutral document shape shared by the repositories and the store adapters.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

/// A scalar or list value held by one document field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Int(i64),
    TextList(Vec<String>),
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(v: Vec<String>) -> Self {
        Self::TextList(v)
    }
}

pub type Fields = BTreeMap<String, FieldValue>;

/// One persisted record: identity, business fields and the two timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Fields,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredDocument {
    /// Text field; a missing field reads as empty.
    pub fn text(&self, name: &str) -> Result<String, String> {
        match self.fields.get(name) {
            None => Ok(String::new()),
            Some(FieldValue::Text(s)) => Ok(s.clone()),
            Some(other) => Err(format!("field '{name}' is not text: {other:?}")),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64, String> {
        match self.fields.get(name) {
            None => Ok(0),
            Some(FieldValue::Int(v)) => Ok(*v),
            Some(other) => Err(format!("field '{name}' is not an integer: {other:?}")),
        }
    }

    pub fn text_list(&self, name: &str) -> Result<Vec<String>, String> {
        match self.fields.get(name) {
            None => Ok(Vec::new()),
            Some(FieldValue::TextList(v)) => Ok(v.clone()),
            Some(other) => Err(format!("field '{name}' is not a list: {other:?}")),
        }
    }

    /// Text field that is present and non-empty.
    pub fn non_empty_text(&self, name: &str) -> Result<Option<String>, String> {
        let s = self.text(name)?;
        Ok((!s.is_empty()).then_some(s))
    }
}

/// Half-open interval `[start, end)` over `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Field equals value.
    Eq { field: String, value: FieldValue },
    /// `created_at` falls inside the window.
    CreatedWithin(TimeWindow),
}

/// Conjunction of predicates; empty matches every document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.predicates.push(Predicate::Eq {
            field: field.into(),
            value: value.into(),
        });
        self
    }

    pub fn created_within(mut self, window: TimeWindow) -> Self {
        self.predicates.push(Predicate::CreatedWithin(window));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Evaluate in process. Used by the in-memory store.
    pub fn matches(&self, doc: &StoredDocument) -> bool {
        self.predicates.iter().all(|p| match p {
            Predicate::Eq { field, value } => doc.fields.get(field) == Some(value),
            Predicate::CreatedWithin(w) => w.contains(doc.created_at),
        })
    }
}

/// Add an equality predicate when the optional constraint is set and non-empty.
pub(crate) fn push_text_eq(preds: &mut Vec<Predicate>, field: &str, value: &Option<String>) {
    if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
        preds.push(Predicate::Eq {
            field: field.to_string(),
            value: FieldValue::Text(v.to_string()),
        });
    }
}
