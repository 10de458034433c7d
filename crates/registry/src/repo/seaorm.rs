use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set, SqlErr, TransactionTrait,
};
use sea_orm::sea_query::JoinType;

use models::{client, client_service, service};

use crate::domain::{ClientChanges, NewClient, NewService, ServiceChanges};
use crate::errors::RegistryError;
use crate::repository::{AssociationRepository, ClientRepository, ServiceRepository};
use crate::validation::{taken, FieldErrors};

/// Postgres-backed store.
pub struct SeaOrmStore {
    pub db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn db_err(e: DbErr) -> RegistryError { RegistryError::Db(e.to_string()) }

/// Unique violations on `field` become the same validation error the pre-check produces.
fn write_err(e: DbErr, entity: &str, field: &str) -> RegistryError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => FieldErrors::single(field, taken(field)).into(),
        _ => match e {
            DbErr::RecordNotUpdated | DbErr::RecordNotFound(_) => RegistryError::not_found(entity),
            other => db_err(other),
        },
    }
}

fn now() -> sea_orm::prelude::DateTimeWithTimeZone { chrono::Utc::now().into() }

#[async_trait::async_trait]
impl ClientRepository for SeaOrmStore {
    async fn list_clients(&self) -> Result<Vec<client::Model>, RegistryError> {
        client::Entity::find().order_by_asc(client::Column::Id).all(&self.db).await.map_err(db_err)
    }

    async fn find_client(&self, id: i32) -> Result<Option<client::Model>, RegistryError> {
        client::Entity::find_by_id(id).one(&self.db).await.map_err(db_err)
    }

    async fn find_client_by_email(&self, email: &str) -> Result<Option<client::Model>, RegistryError> {
        client::find_by_email(&self.db, email).await.map_err(db_err)
    }

    async fn insert_client(&self, new: NewClient) -> Result<client::Model, RegistryError> {
        let ts = now();
        let am = client::ActiveModel {
            name: Set(new.name),
            email: Set(new.email),
            phone: Set(new.phone),
            address: Set(new.address),
            created_at: Set(ts),
            updated_at: Set(ts),
            ..Default::default()
        };
        am.insert(&self.db).await.map_err(|e| write_err(e, "client", "email"))
    }

    async fn update_client(&self, current: client::Model, changes: ClientChanges) -> Result<client::Model, RegistryError> {
        let mut am: client::ActiveModel = current.into();
        if let Some(name) = changes.name { am.name = Set(name); }
        if let Some(email) = changes.email { am.email = Set(email); }
        if let Some(phone) = changes.phone { am.phone = Set(phone); }
        if let Some(address) = changes.address { am.address = Set(address); }
        am.updated_at = Set(now());
        am.update(&self.db).await.map_err(|e| write_err(e, "client", "email"))
    }

    async fn delete_client(&self, id: i32, force: bool) -> Result<u64, RegistryError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        // Row lock serializes against concurrent attach, which locks the parent via its FK check.
        if client::Entity::find_by_id(id).lock_exclusive().one(&txn).await.map_err(db_err)?.is_none() {
            return Err(RegistryError::not_found("client"));
        }
        if !force && client_service::count_for_client(&txn, id).await.map_err(db_err)? > 0 {
            return Err(RegistryError::client_in_use());
        }
        let detached = client_service::detach_all_for_client(&txn, id).await.map_err(db_err)?;
        client::Entity::delete_by_id(id).exec(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(detached)
    }
}

#[async_trait::async_trait]
impl ServiceRepository for SeaOrmStore {
    async fn list_services(&self) -> Result<Vec<service::Model>, RegistryError> {
        service::Entity::find().order_by_asc(service::Column::Id).all(&self.db).await.map_err(db_err)
    }

    async fn find_service(&self, id: i32) -> Result<Option<service::Model>, RegistryError> {
        service::Entity::find_by_id(id).one(&self.db).await.map_err(db_err)
    }

    async fn find_service_by_name(&self, name: &str) -> Result<Option<service::Model>, RegistryError> {
        service::find_by_name(&self.db, name).await.map_err(db_err)
    }

    async fn insert_service(&self, new: NewService) -> Result<service::Model, RegistryError> {
        let ts = now();
        let am = service::ActiveModel {
            name: Set(new.name),
            description: Set(new.description),
            price: Set(new.price),
            created_at: Set(ts),
            updated_at: Set(ts),
            ..Default::default()
        };
        am.insert(&self.db).await.map_err(|e| write_err(e, "service", "name"))
    }

    async fn update_service(&self, current: service::Model, changes: ServiceChanges) -> Result<service::Model, RegistryError> {
        let mut am: service::ActiveModel = current.into();
        if let Some(name) = changes.name { am.name = Set(name); }
        if let Some(description) = changes.description { am.description = Set(description); }
        if let Some(price) = changes.price { am.price = Set(price); }
        am.updated_at = Set(now());
        am.update(&self.db).await.map_err(|e| write_err(e, "service", "name"))
    }

    async fn delete_service(&self, id: i32, force: bool) -> Result<u64, RegistryError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        if service::Entity::find_by_id(id).lock_exclusive().one(&txn).await.map_err(db_err)?.is_none() {
            return Err(RegistryError::not_found("service"));
        }
        if !force && client_service::count_for_service(&txn, id).await.map_err(db_err)? > 0 {
            return Err(RegistryError::service_in_use());
        }
        let detached = client_service::detach_all_for_service(&txn, id).await.map_err(db_err)?;
        service::Entity::delete_by_id(id).exec(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;
        Ok(detached)
    }
}

#[async_trait::async_trait]
impl AssociationRepository for SeaOrmStore {
    async fn attach(&self, client_id: i32, service_id: i32) -> Result<(), RegistryError> {
        match client_service::attach(&self.db, client_id, service_id).await {
            Ok(_) => Ok(()),
            Err(e) => Err(match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    RegistryError::Conflict("client already has this service registered".into())
                }
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => RegistryError::not_found("client or service"),
                _ => db_err(e),
            }),
        }
    }

    async fn detach(&self, client_id: i32, service_id: i32) -> Result<bool, RegistryError> {
        let removed = client_service::detach(&self.db, client_id, service_id).await.map_err(db_err)?;
        Ok(removed > 0)
    }

    async fn detach_all_for_client(&self, client_id: i32) -> Result<u64, RegistryError> {
        client_service::detach_all_for_client(&self.db, client_id).await.map_err(db_err)
    }

    async fn detach_all_for_service(&self, service_id: i32) -> Result<u64, RegistryError> {
        client_service::detach_all_for_service(&self.db, service_id).await.map_err(db_err)
    }

    async fn is_attached(&self, client_id: i32, service_id: i32) -> Result<bool, RegistryError> {
        client_service::exists(&self.db, client_id, service_id).await.map_err(db_err)
    }

    async fn services_of(&self, client_id: i32) -> Result<Vec<service::Model>, RegistryError> {
        service::Entity::find()
            .join(JoinType::InnerJoin, service::Relation::ClientService.def())
            .filter(client_service::Column::ClientId.eq(client_id))
            .order_by_asc(service::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    async fn clients_of(&self, service_id: i32) -> Result<Vec<client::Model>, RegistryError> {
        client::Entity::find()
            .join(JoinType::InnerJoin, client::Relation::ClientService.def())
            .filter(client_service::Column::ServiceId.eq(service_id))
            .order_by_asc(client::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)
    }
}
