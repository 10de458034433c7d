//! Declarative per-field rule sets evaluated before any store mutation.
//!
//! Each operation owns a table of `FieldRule`s. `check` runs every rule of
//! every field and collects the failures keyed by field name; uniqueness is
//! not expressible here because it needs the store, so the managers add it
//! once the synchronous rules for that field pass.

use std::borrow::Cow;
use std::fmt;

use models::{client, service};
use serde::{Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Must be present and non-blank.
    Required,
    /// May be absent, but not blank when present.
    Filled,
    /// JSON string.
    String,
    /// Integer id, either a JSON integer or a string of digits.
    Integer,
    MaxChars(usize),
    Email,
    /// Decimal with exactly `service::PRICE_SCALE` fraction digits that fits the price column.
    Price,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub rules: &'static [Rule],
}

pub const CREATE_CLIENT: [FieldRule; 4] = [
    FieldRule { field: "name", rules: &[Rule::Required, Rule::String, Rule::MaxChars(client::NAME_MAX)] },
    FieldRule { field: "email", rules: &[Rule::Required, Rule::String, Rule::Email, Rule::MaxChars(client::EMAIL_MAX)] },
    FieldRule { field: "phone", rules: &[Rule::String, Rule::MaxChars(client::PHONE_MAX)] },
    FieldRule { field: "address", rules: &[Rule::String, Rule::MaxChars(client::ADDRESS_MAX)] },
];

pub const UPDATE_CLIENT: [FieldRule; 4] = [
    FieldRule { field: "name", rules: &[Rule::Filled, Rule::String, Rule::MaxChars(client::NAME_MAX)] },
    FieldRule { field: "email", rules: &[Rule::Filled, Rule::String, Rule::Email, Rule::MaxChars(client::EMAIL_MAX)] },
    FieldRule { field: "phone", rules: &[Rule::String, Rule::MaxChars(client::PHONE_MAX)] },
    FieldRule { field: "address", rules: &[Rule::String, Rule::MaxChars(client::ADDRESS_MAX)] },
];

pub const CREATE_SERVICE: [FieldRule; 3] = [
    FieldRule { field: "name", rules: &[Rule::Required, Rule::String, Rule::MaxChars(service::NAME_MAX)] },
    FieldRule { field: "description", rules: &[Rule::String, Rule::MaxChars(service::DESCRIPTION_MAX)] },
    FieldRule { field: "price", rules: &[Rule::Required, Rule::Price] },
];

pub const UPDATE_SERVICE: [FieldRule; 3] = [
    FieldRule { field: "name", rules: &[Rule::Filled, Rule::String, Rule::MaxChars(service::NAME_MAX)] },
    FieldRule { field: "description", rules: &[Rule::String, Rule::MaxChars(service::DESCRIPTION_MAX)] },
    FieldRule { field: "price", rules: &[Rule::Filled, Rule::Price] },
];

pub const ASSOCIATION: [FieldRule; 2] = [
    FieldRule { field: "client_id", rules: &[Rule::Required, Rule::Integer] },
    FieldRule { field: "service_id", rules: &[Rule::Required, Rule::Integer] },
];

/// Anything whose raw JSON fields can be looked up by name for validation.
pub trait Fields {
    fn field(&self, name: &str) -> Option<&Value>;
}

/// Textual form of a scalar: strings as-is, anything else as JSON.
pub fn text_of(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        other => Cow::Owned(other.to_string()),
    }
}

/// An id sent as a JSON integer or as a string of digits.
pub fn as_id(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    }
}

/// Field-keyed validation failures, in rule-table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(Vec<(String, Vec<String>)>);

impl FieldErrors {
    pub fn new() -> Self { Self::default() }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        let message = message.into();
        match self.0.iter_mut().find(|(f, _)| f.as_str() == field) {
            Some((_, messages)) => messages.push(message),
            None => self.0.push((field.to_string(), vec![message])),
        }
    }

    pub fn contains(&self, field: &str) -> bool { self.0.iter().any(|(f, _)| f.as_str() == field) }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.iter().find(|(f, _)| f.as_str() == field).map(|(_, m)| m.as_slice())
    }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn len(&self) -> usize { self.0.iter().map(|(_, m)| m.len()).sum() }

    pub fn first_message(&self) -> Option<&str> {
        self.0.first().and_then(|(_, m)| m.first()).map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(first) = self.first_message() else { return write!(f, "invalid input") };
        match self.len() {
            1 => write!(f, "{first}"),
            2 => write!(f, "{first} (and 1 more error)"),
            n => write!(f, "{first} (and {} more errors)", n - 1),
        }
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(f, m)| (f, m)))
    }
}

fn label(field: &str) -> String { field.replace('_', " ") }

pub fn required(field: &str) -> String { format!("The {} field is required.", label(field)) }

pub fn taken(field: &str) -> String { format!("The {} has already been taken.", label(field)) }

pub fn decimal_places(field: &str, places: usize) -> String {
    format!("The {} field must have {} decimal places.", label(field), places)
}

fn is_blank(value: &Value) -> bool {
    value.as_str().is_some_and(|s| s.trim().is_empty())
}

fn violation(rule: Rule, field: &str, value: &Value) -> Option<String> {
    let text = text_of(value);
    match rule {
        Rule::Required if is_blank(value) => Some(required(field)),
        Rule::Filled if is_blank(value) => Some(format!("The {} field must have a value.", label(field))),
        Rule::String if !value.is_string() => Some(format!("The {} field must be a string.", label(field))),
        Rule::Integer if as_id(value).is_none() => Some(format!("The {} field must be an integer.", label(field))),
        Rule::MaxChars(max) if text.chars().count() > max => {
            Some(format!("The {} field must not be greater than {} characters.", label(field), max))
        }
        Rule::Email if client::validate_email(&text).is_err() => {
            Some(format!("The {} field must be a valid email address.", label(field)))
        }
        Rule::Price if service::validate_price(&text).is_err() => Some(decimal_places(field, service::PRICE_SCALE)),
        _ => None,
    }
}

/// Run every rule of `table` against `input`.
///
/// Absent and `null` fields only fail `Required`; a blank or mistyped field
/// skips its remaining rules.
pub fn check<F: Fields + ?Sized>(table: &[FieldRule], input: &F) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for rule in table {
        let Some(value) = input.field(rule.field).filter(|v| !v.is_null()) else {
            if rule.rules.contains(&Rule::Required) {
                errors.add(rule.field, required(rule.field));
            }
            continue;
        };
        for r in rule.rules {
            if let Some(message) = violation(*r, rule.field, value) {
                errors.add(rule.field, message);
                if matches!(r, Rule::Required | Rule::Filled | Rule::String | Rule::Integer) { break; }
            }
        }
    }
    errors
}
