//! Business layer for the client/service registry.
//! - Validation rule sets and typed inputs live in `validation` and `domain`.
//! - Persistence sits behind the traits in `repository`; `repo` holds the SeaORM store.
//! - `ClientManager`/`ServiceManager` implement the use-cases on top of any `Store`.

pub mod errors;
pub mod domain;
pub mod validation;
pub mod repository;
pub mod repo;
pub mod client_manager;
pub mod service_manager;
#[cfg(test)]
pub mod test_support;

pub use client_manager::ClientManager;
pub use errors::RegistryError;
pub use repository::Store;
pub use service_manager::ServiceManager;
