use std::sync::Arc;

use models::service;
use tracing::{info, instrument};

use crate::domain::{NewService, ServiceChanges, ServiceInput, ServiceView};
use crate::errors::RegistryError;
use crate::repository::Store;
use crate::validation::{self, taken, CREATE_SERVICE, UPDATE_SERVICE};

/// Service use-cases; the mirror of [`crate::client_manager::ClientManager`].
pub struct ServiceManager<R: Store + ?Sized> {
    repo: Arc<R>,
}

impl<R: Store + ?Sized> ServiceManager<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    pub async fn list(&self) -> Result<Vec<service::Model>, RegistryError> { self.repo.list_services().await }

    #[instrument(skip(self))]
    pub async fn create(&self, input: ServiceInput) -> Result<ServiceView, RegistryError> {
        let input = input.normalized();
        let mut errors = validation::check(&CREATE_SERVICE, &input);
        if let (false, Some(name)) = (errors.contains("name"), input.name_str()) {
            if self.repo.find_service_by_name(name).await?.is_some() {
                errors.add("name", taken("name"));
            }
        }
        errors.into_result()?;

        let service = self.repo.insert_service(NewService::try_from(input)?).await?;
        info!(service_id = service.id, "service_created");
        Ok(ServiceView { service, clients: Vec::new() })
    }

    pub async fn get(&self, id: i32) -> Result<ServiceView, RegistryError> {
        let service = self.require(id).await?;
        self.view(service).await
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: i32, input: ServiceInput) -> Result<ServiceView, RegistryError> {
        let current = self.require(id).await?;
        let input = input.normalized();
        let mut errors = validation::check(&UPDATE_SERVICE, &input);
        if let (false, Some(name)) = (errors.contains("name"), input.name_str()) {
            if let Some(other) = self.repo.find_service_by_name(name).await? {
                if other.id != id {
                    errors.add("name", taken("name"));
                }
            }
        }
        errors.into_result()?;

        let service = self.repo.update_service(current, ServiceChanges::try_from(input)?).await?;
        info!(service_id = id, "service_updated");
        self.view(service).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32, force: bool) -> Result<(), RegistryError> {
        let detached = self.repo.delete_service(id, force).await?;
        info!(service_id = id, detached, "service_deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn remove_all_clients(&self, id: i32) -> Result<ServiceView, RegistryError> {
        let service = self.require(id).await?;
        let removed = self.repo.detach_all_for_service(id).await?;
        info!(service_id = id, removed, "clients_detached");
        self.view(service).await
    }

    async fn require(&self, id: i32) -> Result<service::Model, RegistryError> {
        self.repo.find_service(id).await?.ok_or_else(|| RegistryError::not_found("service"))
    }

    async fn view(&self, service: service::Model) -> Result<ServiceView, RegistryError> {
        let clients = self.repo.clients_of(service.id).await?;
        Ok(ServiceView { service, clients })
    }
}
