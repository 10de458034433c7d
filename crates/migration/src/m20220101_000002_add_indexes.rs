use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ClientService: the PK leads with client_id, so service-side lookups need their own index
        manager
            .create_index(
                Index::create()
                    .name("idx_client_service_service")
                    .table(ClientService::Table)
                    .col(ClientService::ServiceId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_client_service_service").table(ClientService::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ClientService { Table, ServiceId }
