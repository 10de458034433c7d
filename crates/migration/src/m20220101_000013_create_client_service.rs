//! Create `client_service` join table.
//! The composite primary key keeps each (client, service) pair unique.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClientService::Table)
                    .if_not_exists()
                    .col(integer(ClientService::ClientId).not_null())
                    .col(integer(ClientService::ServiceId).not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_client_service")
                            .col(ClientService::ClientId)
                            .col(ClientService::ServiceId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_service_client")
                            .from(ClientService::Table, ClientService::ClientId)
                            .to(Client::Table, Client::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_service_service")
                            .from(ClientService::Table, ClientService::ServiceId)
                            .to(Service::Table, Service::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ClientService::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ClientService { Table, ClientId, ServiceId }

#[derive(DeriveIden)]
enum Client { Table, Id }

#[derive(DeriveIden)]
enum Service { Table, Id }
