use std::borrow::Cow;

use models::{client, service};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{self, FieldErrors, Fields};

/// Client fields as received from a request; used by both create and update.
/// Values stay raw JSON until validated so type errors are reported per field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientInput {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub phone: Option<Value>,
    #[serde(default)]
    pub address: Option<Value>,
}

/// Service fields as received from a request. `price` may be a JSON string or number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceInput {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
}

/// Body of the attach/detach endpoints; ids may be integers or digit strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssociationInput {
    #[serde(default)]
    pub client_id: Option<Value>,
    #[serde(default)]
    pub service_id: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Partial update; `Some(None)` clears an optional column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<Option<String>>,
    pub address: Option<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewService {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<Decimal>,
}

/// Client with its services expanded one level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientView {
    #[serde(flatten)]
    pub client: client::Model,
    pub services: Vec<service::Model>,
}

/// Service with its clients expanded one level.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceView {
    #[serde(flatten)]
    pub service: service::Model,
    pub clients: Vec<client::Model>,
}

/// Trim strings; `null` means "not supplied".
fn trimmed(value: Option<Value>) -> Option<Value> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(Value::String(s.trim().to_string())),
        other => Some(other),
    }
}

fn as_str(value: &Option<Value>) -> Option<&str> {
    value.as_ref().and_then(Value::as_str)
}

fn into_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Blank optional text means "no value".
fn blank_to_none(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

impl ClientInput {
    pub fn normalized(self) -> Self {
        Self {
            name: trimmed(self.name),
            email: trimmed(self.email),
            phone: trimmed(self.phone),
            address: trimmed(self.address),
        }
    }

    pub fn email_str(&self) -> Option<&str> { as_str(&self.email) }
}

impl Fields for ClientInput {
    fn field(&self, name: &str) -> Option<&Value> {
        match name {
            "name" => self.name.as_ref(),
            "email" => self.email.as_ref(),
            "phone" => self.phone.as_ref(),
            "address" => self.address.as_ref(),
            _ => None,
        }
    }
}

impl TryFrom<ClientInput> for NewClient {
    type Error = FieldErrors;

    fn try_from(input: ClientInput) -> Result<Self, Self::Error> {
        match (into_text(input.name), into_text(input.email)) {
            (Some(name), Some(email)) => Ok(NewClient {
                name,
                email,
                phone: into_text(input.phone).and_then(blank_to_none),
                address: into_text(input.address).and_then(blank_to_none),
            }),
            (name, email) => {
                let mut errors = FieldErrors::new();
                if name.is_none() { errors.add("name", validation::required("name")); }
                if email.is_none() { errors.add("email", validation::required("email")); }
                Err(errors)
            }
        }
    }
}

impl From<ClientInput> for ClientChanges {
    fn from(input: ClientInput) -> Self {
        Self {
            name: into_text(input.name),
            email: into_text(input.email),
            phone: into_text(input.phone).map(blank_to_none),
            address: into_text(input.address).map(blank_to_none),
        }
    }
}

impl ServiceInput {
    pub fn normalized(self) -> Self {
        Self { name: trimmed(self.name), description: trimmed(self.description), price: trimmed(self.price) }
    }

    pub fn name_str(&self) -> Option<&str> { as_str(&self.name) }

    /// Textual form of the price as the client sent it.
    pub fn price_text(&self) -> Option<Cow<'_, str>> {
        self.price.as_ref().filter(|v| !v.is_null()).map(validation::text_of)
    }
}

impl Fields for ServiceInput {
    fn field(&self, name: &str) -> Option<&Value> {
        match name {
            "name" => self.name.as_ref(),
            "description" => self.description.as_ref(),
            "price" => self.price.as_ref(),
            _ => None,
        }
    }
}

fn parse_price(input: &ServiceInput) -> Result<Option<Decimal>, FieldErrors> {
    match input.price_text() {
        None => Ok(None),
        Some(text) => models::service::validate_price(&text)
            .map(Some)
            .map_err(|_| FieldErrors::single("price", validation::decimal_places("price", models::service::PRICE_SCALE))),
    }
}

impl TryFrom<ServiceInput> for NewService {
    type Error = FieldErrors;

    fn try_from(input: ServiceInput) -> Result<Self, Self::Error> {
        let price = parse_price(&input)?;
        match (into_text(input.name), price) {
            (Some(name), Some(price)) => Ok(NewService {
                name,
                description: into_text(input.description).and_then(blank_to_none),
                price,
            }),
            (name, price) => {
                let mut errors = FieldErrors::new();
                if name.is_none() { errors.add("name", validation::required("name")); }
                if price.is_none() { errors.add("price", validation::required("price")); }
                Err(errors)
            }
        }
    }
}

impl TryFrom<ServiceInput> for ServiceChanges {
    type Error = FieldErrors;

    fn try_from(input: ServiceInput) -> Result<Self, Self::Error> {
        let price = parse_price(&input)?;
        Ok(Self {
            name: into_text(input.name),
            description: into_text(input.description).map(blank_to_none),
            price,
        })
    }
}

impl Fields for AssociationInput {
    fn field(&self, name: &str) -> Option<&Value> {
        match name {
            "client_id" => self.client_id.as_ref(),
            "service_id" => self.service_id.as_ref(),
            _ => None,
        }
    }
}

impl AssociationInput {
    /// Both ids, or field errors naming the missing ones.
    pub fn ids(&self) -> Result<(i32, i32), FieldErrors> {
        validation::check(&validation::ASSOCIATION, self).into_result()?;
        let id = |v: &Option<Value>| v.as_ref().and_then(validation::as_id);
        match (id(&self.client_id), id(&self.service_id)) {
            (Some(c), Some(s)) => Ok((c, s)),
            _ => Err(FieldErrors::single("client_id", validation::required("client_id"))),
        }
    }
}
