use async_trait::async_trait;
use models::{client, service};

use crate::domain::{ClientChanges, NewClient, NewService, ServiceChanges};
use crate::errors::RegistryError;

/// Persistence for client rows.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn list_clients(&self) -> Result<Vec<client::Model>, RegistryError>;
    async fn find_client(&self, id: i32) -> Result<Option<client::Model>, RegistryError>;
    async fn find_client_by_email(&self, email: &str) -> Result<Option<client::Model>, RegistryError>;
    /// A concurrent duplicate email is reported as a validation error on `email`.
    async fn insert_client(&self, new: NewClient) -> Result<client::Model, RegistryError>;
    async fn update_client(&self, current: client::Model, changes: ClientChanges) -> Result<client::Model, RegistryError>;
    /// Removes the client and its join rows atomically, returning how many links went with it.
    /// Without `force` a client that still has links is left untouched and `Conflict` is returned.
    async fn delete_client(&self, id: i32, force: bool) -> Result<u64, RegistryError>;
}

/// Persistence for service rows.
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn list_services(&self) -> Result<Vec<service::Model>, RegistryError>;
    async fn find_service(&self, id: i32) -> Result<Option<service::Model>, RegistryError>;
    async fn find_service_by_name(&self, name: &str) -> Result<Option<service::Model>, RegistryError>;
    async fn insert_service(&self, new: NewService) -> Result<service::Model, RegistryError>;
    async fn update_service(&self, current: service::Model, changes: ServiceChanges) -> Result<service::Model, RegistryError>;
    /// Same contract as [`ClientRepository::delete_client`].
    async fn delete_service(&self, id: i32, force: bool) -> Result<u64, RegistryError>;
}

/// The client/service join relation.
#[async_trait]
pub trait AssociationRepository: Send + Sync {
    /// Fails with `Conflict` when the pair already exists.
    async fn attach(&self, client_id: i32, service_id: i32) -> Result<(), RegistryError>;
    async fn detach(&self, client_id: i32, service_id: i32) -> Result<bool, RegistryError>;
    async fn detach_all_for_client(&self, client_id: i32) -> Result<u64, RegistryError>;
    async fn detach_all_for_service(&self, service_id: i32) -> Result<u64, RegistryError>;
    async fn is_attached(&self, client_id: i32, service_id: i32) -> Result<bool, RegistryError>;
    async fn services_of(&self, client_id: i32) -> Result<Vec<service::Model>, RegistryError>;
    async fn clients_of(&self, service_id: i32) -> Result<Vec<client::Model>, RegistryError>;
}

/// Everything the managers need from the store.
pub trait Store: ClientRepository + ServiceRepository + AssociationRepository {}

impl<T> Store for T where T: ClientRepository + ServiceRepository + AssociationRepository {}

/// In-memory store for tests and local experiments; enforces the same
/// uniqueness rules as the database schema.
pub mod mock {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};
    use std::sync::{Mutex, MutexGuard, PoisonError};

    use chrono::Utc;

    use crate::validation::{taken, FieldErrors};

    #[derive(Default)]
    struct State {
        clients: BTreeMap<i32, client::Model>,
        services: BTreeMap<i32, service::Model>,
        links: BTreeSet<(i32, i32)>, // (client_id, service_id)
        last_client_id: i32,
        last_service_id: i32,
    }

    #[derive(Default)]
    pub struct MemoryStore {
        state: Mutex<State>,
    }

    impl MemoryStore {
        pub fn new() -> Self { Self::default() }

        fn state(&self) -> MutexGuard<'_, State> {
            self.state.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// Number of join rows, across all clients.
        pub fn link_count(&self) -> usize { self.state().links.len() }
    }

    #[async_trait]
    impl ClientRepository for MemoryStore {
        async fn list_clients(&self) -> Result<Vec<client::Model>, RegistryError> {
            Ok(self.state().clients.values().cloned().collect())
        }

        async fn find_client(&self, id: i32) -> Result<Option<client::Model>, RegistryError> {
            Ok(self.state().clients.get(&id).cloned())
        }

        async fn find_client_by_email(&self, email: &str) -> Result<Option<client::Model>, RegistryError> {
            Ok(self.state().clients.values().find(|c| c.email == email).cloned())
        }

        async fn insert_client(&self, new: NewClient) -> Result<client::Model, RegistryError> {
            let mut state = self.state();
            if state.clients.values().any(|c| c.email == new.email) {
                return Err(FieldErrors::single("email", taken("email")).into());
            }
            state.last_client_id += 1;
            let now = Utc::now().into();
            let model = client::Model {
                id: state.last_client_id,
                name: new.name,
                email: new.email,
                phone: new.phone,
                address: new.address,
                created_at: now,
                updated_at: now,
            };
            state.clients.insert(model.id, model.clone());
            Ok(model)
        }

        async fn update_client(&self, current: client::Model, changes: ClientChanges) -> Result<client::Model, RegistryError> {
            let mut state = self.state();
            if let Some(email) = &changes.email {
                if state.clients.values().any(|c| &c.email == email && c.id != current.id) {
                    return Err(FieldErrors::single("email", taken("email")).into());
                }
            }
            let row = state.clients.get_mut(&current.id).ok_or_else(|| RegistryError::not_found("client"))?;
            if let Some(name) = changes.name { row.name = name; }
            if let Some(email) = changes.email { row.email = email; }
            if let Some(phone) = changes.phone { row.phone = phone; }
            if let Some(address) = changes.address { row.address = address; }
            row.updated_at = Utc::now().into();
            Ok(row.clone())
        }

        async fn delete_client(&self, id: i32, force: bool) -> Result<u64, RegistryError> {
            let mut state = self.state();
            if !state.clients.contains_key(&id) {
                return Err(RegistryError::not_found("client"));
            }
            let before = state.links.len();
            let attached = state.links.iter().filter(|(c, _)| *c == id).count();
            if attached > 0 && !force {
                return Err(RegistryError::client_in_use());
            }
            state.links.retain(|(c, _)| *c != id);
            state.clients.remove(&id);
            Ok((before - state.links.len()) as u64)
        }
    }

    #[async_trait]
    impl ServiceRepository for MemoryStore {
        async fn list_services(&self) -> Result<Vec<service::Model>, RegistryError> {
            Ok(self.state().services.values().cloned().collect())
        }

        async fn find_service(&self, id: i32) -> Result<Option<service::Model>, RegistryError> {
            Ok(self.state().services.get(&id).cloned())
        }

        async fn find_service_by_name(&self, name: &str) -> Result<Option<service::Model>, RegistryError> {
            Ok(self.state().services.values().find(|s| s.name == name).cloned())
        }

        async fn insert_service(&self, new: NewService) -> Result<service::Model, RegistryError> {
            let mut state = self.state();
            if state.services.values().any(|s| s.name == new.name) {
                return Err(FieldErrors::single("name", taken("name")).into());
            }
            state.last_service_id += 1;
            let now = Utc::now().into();
            let model = service::Model {
                id: state.last_service_id,
                name: new.name,
                description: new.description,
                price: new.price,
                created_at: now,
                updated_at: now,
            };
            state.services.insert(model.id, model.clone());
            Ok(model)
        }

        async fn update_service(&self, current: service::Model, changes: ServiceChanges) -> Result<service::Model, RegistryError> {
            let mut state = self.state();
            if let Some(name) = &changes.name {
                if state.services.values().any(|s| &s.name == name && s.id != current.id) {
                    return Err(FieldErrors::single("name", taken("name")).into());
                }
            }
            let row = state.services.get_mut(&current.id).ok_or_else(|| RegistryError::not_found("service"))?;
            if let Some(name) = changes.name { row.name = name; }
            if let Some(description) = changes.description { row.description = description; }
            if let Some(price) = changes.price { row.price = price; }
            row.updated_at = Utc::now().into();
            Ok(row.clone())
        }

        async fn delete_service(&self, id: i32, force: bool) -> Result<u64, RegistryError> {
            let mut state = self.state();
            if !state.services.contains_key(&id) {
                return Err(RegistryError::not_found("service"));
            }
            let before = state.links.len();
            let attached = state.links.iter().filter(|(_, s)| *s == id).count();
            if attached > 0 && !force {
                return Err(RegistryError::service_in_use());
            }
            state.links.retain(|(_, s)| *s != id);
            state.services.remove(&id);
            Ok((before - state.links.len()) as u64)
        }
    }

    #[async_trait]
    impl AssociationRepository for MemoryStore {
        async fn attach(&self, client_id: i32, service_id: i32) -> Result<(), RegistryError> {
            let mut state = self.state();
            if !state.clients.contains_key(&client_id) {
                return Err(RegistryError::not_found("client"));
            }
            if !state.services.contains_key(&service_id) {
                return Err(RegistryError::not_found("service"));
            }
            if !state.links.insert((client_id, service_id)) {
                return Err(RegistryError::Conflict("client already has this service registered".into()));
            }
            Ok(())
        }

        async fn detach(&self, client_id: i32, service_id: i32) -> Result<bool, RegistryError> {
            Ok(self.state().links.remove(&(client_id, service_id)))
        }

        async fn detach_all_for_client(&self, client_id: i32) -> Result<u64, RegistryError> {
            let mut state = self.state();
            let before = state.links.len();
            state.links.retain(|(c, _)| *c != client_id);
            Ok((before - state.links.len()) as u64)
        }

        async fn detach_all_for_service(&self, service_id: i32) -> Result<u64, RegistryError> {
            let mut state = self.state();
            let before = state.links.len();
            state.links.retain(|(_, s)| *s != service_id);
            Ok((before - state.links.len()) as u64)
        }

        async fn is_attached(&self, client_id: i32, service_id: i32) -> Result<bool, RegistryError> {
            Ok(self.state().links.contains(&(client_id, service_id)))
        }

        async fn services_of(&self, client_id: i32) -> Result<Vec<service::Model>, RegistryError> {
            let state = self.state();
            Ok(state
                .links
                .iter()
                .filter(|(c, _)| *c == client_id)
                .filter_map(|(_, s)| state.services.get(s).cloned())
                .collect())
        }

        async fn clients_of(&self, service_id: i32) -> Result<Vec<client::Model>, RegistryError> {
            let state = self.state();
            let mut clients: Vec<client::Model> = state
                .links
                .iter()
                .filter(|(_, s)| *s == service_id)
                .filter_map(|(c, _)| state.clients.get(c).cloned())
                .collect();
            clients.sort_by_key(|c| c.id);
            Ok(clients)
        }
    }
}
