use std::sync::Arc;

use registry::{ClientManager, ServiceManager, Store};

/// Shared handler state; the store is a trait object so tests can swap in memory.
#[derive(Clone)]
pub struct ServerState {
    pub clients: Arc<ClientManager<dyn Store>>,
    pub services: Arc<ServiceManager<dyn Store>>,
}

impl ServerState {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            clients: Arc::new(ClientManager::new(Arc::clone(&store))),
            services: Arc::new(ServiceManager::new(store)),
        }
    }
}
