use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter};
use serde::{Deserialize, Serialize};

use crate::{client_service, errors, service};

pub const NAME_MAX: usize = 255;
pub const EMAIL_MAX: usize = 255;
pub const PHONE_MAX: usize = 255;
pub const ADDRESS_MAX: usize = 255;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "client")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    ClientService,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::ClientService => Entity::has_many(client_service::Entity).into(),
        }
    }
}

impl Related<client_service::Entity> for Entity {
    fn to() -> RelationDef { Relation::ClientService.def() }
}

impl Related<service::Entity> for Entity {
    fn to() -> RelationDef { client_service::Relation::Service.def() }

    fn via() -> Option<RelationDef> { Some(client_service::Relation::Client.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

/// Structural email check: one `@`, non-empty local part, dotted labels on the domain side.
pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    let invalid = || errors::ModelError::Validation("invalid email".into());
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return Err(invalid());
    }
    let labels_ok = domain.split('.').all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_alphanumeric() || c == '-')
    });
    if !labels_ok {
        return Err(invalid());
    }
    Ok(())
}

pub async fn find_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Result<Option<Model>, DbErr> {
    Entity::find().filter(Column::Email.eq(email)).one(db).await
}

#[cfg(test)]
mod tests {
    use super::validate_email;

    #[test]
    fn accepts_common_addresses() {
        for ok in ["john.doe@examp.com", "a@b", "first+tag@mail.example.org", "x_y@sub-domain.io"] {
            assert!(validate_email(ok).is_ok(), "{ok} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "plain", "@example.com", "user@", "a@@b.com", "a b@c.com", "a@b..com", ".a@b.com", "a@-b.com"] {
            assert!(validate_email(bad).is_err(), "{bad} should be invalid");
        }
    }
}
