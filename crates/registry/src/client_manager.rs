use std::sync::Arc;

use models::client;
use tracing::{info, instrument};

use crate::domain::{AssociationInput, ClientChanges, ClientInput, ClientView, NewClient};
use crate::errors::RegistryError;
use crate::repository::Store;
use crate::validation::{self, taken, CREATE_CLIENT, UPDATE_CLIENT};

/// Client use-cases: validation, delete guard and service attachment.
///
/// ```
/// use std::sync::Arc;
/// use registry::client_manager::ClientManager;
/// use registry::domain::ClientInput;
/// use registry::repository::mock::MemoryStore;
///
/// tokio_test::block_on(async {
///     let clients = ClientManager::new(Arc::new(MemoryStore::new()));
///     let input = ClientInput { name: Some("Ana".into()), email: Some("ana@example.com".into()), ..Default::default() };
///     let view = clients.create(input).await.unwrap();
///     assert_eq!(view.client.id, 1);
///     assert!(view.services.is_empty());
/// });
/// ```
pub struct ClientManager<R: Store + ?Sized> {
    repo: Arc<R>,
}

impl<R: Store + ?Sized> ClientManager<R> {
    pub fn new(repo: Arc<R>) -> Self { Self { repo } }

    pub async fn list(&self) -> Result<Vec<client::Model>, RegistryError> { self.repo.list_clients().await }

    #[instrument(skip(self))]
    pub async fn create(&self, input: ClientInput) -> Result<ClientView, RegistryError> {
        let input = input.normalized();
        let mut errors = validation::check(&CREATE_CLIENT, &input);
        if let (false, Some(email)) = (errors.contains("email"), input.email_str()) {
            if self.repo.find_client_by_email(email).await?.is_some() {
                errors.add("email", taken("email"));
            }
        }
        errors.into_result()?;

        let client = self.repo.insert_client(NewClient::try_from(input)?).await?;
        info!(client_id = client.id, "client_created");
        Ok(ClientView { client, services: Vec::new() })
    }

    pub async fn get(&self, id: i32) -> Result<ClientView, RegistryError> {
        let client = self.require(id).await?;
        self.view(client).await
    }

    /// Partial update; absent fields keep their value.
    #[instrument(skip(self))]
    pub async fn update(&self, id: i32, input: ClientInput) -> Result<ClientView, RegistryError> {
        let current = self.require(id).await?;
        let input = input.normalized();
        let mut errors = validation::check(&UPDATE_CLIENT, &input);
        if let (false, Some(email)) = (errors.contains("email"), input.email_str()) {
            if let Some(other) = self.repo.find_client_by_email(email).await? {
                if other.id != id {
                    errors.add("email", taken("email"));
                }
            }
        }
        errors.into_result()?;

        let client = self.repo.update_client(current, ClientChanges::from(input)).await?;
        info!(client_id = id, "client_updated");
        self.view(client).await
    }

    /// Refuses while services are attached unless `force`.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32, force: bool) -> Result<(), RegistryError> {
        let detached = self.repo.delete_client(id, force).await?;
        info!(client_id = id, detached, "client_deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn add_service(&self, input: AssociationInput) -> Result<ClientView, RegistryError> {
        let (client_id, service_id) = input.ids()?;
        let client = self.require_pair(client_id, service_id).await?;
        if self.repo.is_attached(client_id, service_id).await? {
            return Err(RegistryError::Conflict("client already has this service registered".into()));
        }
        self.repo.attach(client_id, service_id).await?;
        info!(client_id, service_id, "service_attached");
        self.view(client).await
    }

    #[instrument(skip(self))]
    pub async fn remove_service(&self, input: AssociationInput) -> Result<ClientView, RegistryError> {
        let (client_id, service_id) = input.ids()?;
        let client = self.require_pair(client_id, service_id).await?;
        if !self.repo.detach(client_id, service_id).await? {
            return Err(RegistryError::NotFound("client does not have this service registered".into()));
        }
        info!(client_id, service_id, "service_detached");
        self.view(client).await
    }

    #[instrument(skip(self))]
    pub async fn remove_all_services(&self, id: i32) -> Result<ClientView, RegistryError> {
        let client = self.require(id).await?;
        let removed = self.repo.detach_all_for_client(id).await?;
        info!(client_id = id, removed, "services_detached");
        self.view(client).await
    }

    async fn require(&self, id: i32) -> Result<client::Model, RegistryError> {
        self.repo.find_client(id).await?.ok_or_else(|| RegistryError::not_found("client"))
    }

    async fn require_pair(&self, client_id: i32, service_id: i32) -> Result<client::Model, RegistryError> {
        let client = self.require(client_id).await?;
        if self.repo.find_service(service_id).await?.is_none() {
            return Err(RegistryError::not_found("service"));
        }
        Ok(client)
    }

    async fn view(&self, client: client::Model) -> Result<ClientView, RegistryError> {
        let services = self.repo.services_of(client.id).await?;
        Ok(ClientView { client, services })
    }
}
