use sea_orm::{entity::prelude::*, ConnectionTrait, QueryFilter};
use serde::{Deserialize, Serialize};

use crate::{client, client_service, errors};

pub const NAME_MAX: usize = 255;
pub const DESCRIPTION_MAX: usize = 500;
/// Fraction digits a price must carry.
pub const PRICE_SCALE: usize = 2;
/// Integer digits allowed by `NUMERIC(10, 2)`.
pub const PRICE_INTEGER_DIGITS: usize = 8;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "service")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
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

impl Related<client::Entity> for Entity {
    fn to() -> RelationDef { client_service::Relation::Client.def() }

    fn via() -> Option<RelationDef> { Some(client_service::Relation::Service.def().rev()) }
}

impl ActiveModelBehavior for ActiveModel {}

/// Parse a price written as `digits.dd`; the textual form must carry exactly two fraction digits.
pub fn validate_price(raw: &str) -> Result<Decimal, errors::ModelError> {
    let (int_part, frac_part) = raw
        .split_once('.')
        .ok_or_else(|| errors::ModelError::Validation("price must have 2 decimal places".into()))?;
    let digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if !digits(int_part) || !digits(frac_part) || frac_part.len() != PRICE_SCALE {
        return Err(errors::ModelError::Validation("price must have 2 decimal places".into()));
    }
    if int_part.len() > PRICE_INTEGER_DIGITS {
        return Err(errors::ModelError::Validation("price is too large".into()));
    }
    raw.parse::<Decimal>()
        .map_err(|e| errors::ModelError::Validation(format!("price is not a decimal: {e}")))
}

pub async fn find_by_name<C: ConnectionTrait>(db: &C, name: &str) -> Result<Option<Model>, DbErr> {
    Entity::find().filter(Column::Name.eq(name)).one(db).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_keeps_two_fraction_digits() {
        let p = validate_price("10.50").unwrap();
        assert_eq!(p.to_string(), "10.50");
        assert_eq!(p.scale(), 2);
    }

    #[test]
    fn price_rejects_other_shapes() {
        for bad in ["10", "10.5", "10.500", ".50", "10.", "-1.00", "1e2.00", "abc", "123456789.00"] {
            assert!(validate_price(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn price_upper_bound_fits_column() {
        assert!(validate_price("99999999.99").is_ok());
    }
}
