use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use serde::Serialize;

pub mod images;

/// Validation messages keyed by form field, in the order the rules ran.
///
/// Serializes as `{"image": ["The image field is required."]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// The first message of the first failing field.
    pub fn first_message(&self) -> Option<&str> {
        self.messages().next()
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.0.values().flatten().map(String::as_str)
    }
}

impl Display for FieldErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let messages = self.messages().collect::<Vec<_>>();
        write!(f, "{}", messages.join(" "))
    }
}
