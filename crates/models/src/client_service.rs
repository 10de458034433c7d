//! Join table linking clients to the services they have registered.

use sea_orm::{entity::prelude::*, ActiveModelTrait, ConnectionTrait, PaginatorTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::{client, service};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "client_service")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub client_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub service_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Client,
    Service,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Client => Entity::belongs_to(client::Entity)
                .from(Column::ClientId)
                .to(client::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
            Relation::Service => Entity::belongs_to(service::Entity)
                .from(Column::ServiceId)
                .to(service::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<client::Entity> for Entity {
    fn to() -> RelationDef { Relation::Client.def() }
}

impl Related<service::Entity> for Entity {
    fn to() -> RelationDef { Relation::Service.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Insert the pair; a duplicate surfaces as a primary-key violation from the store.
pub async fn attach<C: ConnectionTrait>(db: &C, client_id: i32, service_id: i32) -> Result<Model, DbErr> {
    let am = ActiveModel { client_id: Set(client_id), service_id: Set(service_id) };
    am.insert(db).await
}

/// Returns the number of removed rows (0 or 1).
pub async fn detach<C: ConnectionTrait>(db: &C, client_id: i32, service_id: i32) -> Result<u64, DbErr> {
    let res = Entity::delete_many()
        .filter(Column::ClientId.eq(client_id))
        .filter(Column::ServiceId.eq(service_id))
        .exec(db)
        .await?;
    Ok(res.rows_affected)
}

pub async fn detach_all_for_client<C: ConnectionTrait>(db: &C, client_id: i32) -> Result<u64, DbErr> {
    let res = Entity::delete_many().filter(Column::ClientId.eq(client_id)).exec(db).await?;
    Ok(res.rows_affected)
}

pub async fn detach_all_for_service<C: ConnectionTrait>(db: &C, service_id: i32) -> Result<u64, DbErr> {
    let res = Entity::delete_many().filter(Column::ServiceId.eq(service_id)).exec(db).await?;
    Ok(res.rows_affected)
}

pub async fn exists<C: ConnectionTrait>(db: &C, client_id: i32, service_id: i32) -> Result<bool, DbErr> {
    let found = Entity::find_by_id((client_id, service_id)).one(db).await?;
    Ok(found.is_some())
}

pub async fn count_for_client<C: ConnectionTrait>(db: &C, client_id: i32) -> Result<u64, DbErr> {
    Entity::find().filter(Column::ClientId.eq(client_id)).count(db).await
}

pub async fn count_for_service<C: ConnectionTrait>(db: &C, service_id: i32) -> Result<u64, DbErr> {
    Entity::find().filter(Column::ServiceId.eq(service_id)).count(db).await
}
