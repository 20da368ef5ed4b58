//! # Service location.
//!
//! The registry resolves two kinds of collaborators by name:
//! - [`Service`]s, the targets of `service::method` calls;
//! - [`Storage`]s, whose caches are cleared when their object is modified.
//!
//! [`ServiceLocator`] is the lookup seam and [`Container`] its in-memory
//! implementation.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use hookbind::{ActionError, Container, GenericEvent, Service, ServiceLocator};
//!
//! struct Indexer;
//!
//! #[async_trait]
//! impl Service for Indexer {
//!     async fn call(&self, method: &str, _event: &GenericEvent) -> Result<(), ActionError> {
//!         match method {
//!             "reindex" => Ok(()),
//!             other => Err(ActionError::fail(format!("unexpected {other}"))),
//!         }
//!     }
//!
//!     fn has_method(&self, method: &str) -> bool {
//!         method == "reindex"
//!     }
//! }
//!
//! let container = Container::new().with_service("search.indexer", Arc::new(Indexer));
//! assert!(container.has("search.indexer"));
//! assert!(container.service("mailer").is_none());
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::configuration::ObjectDefinition;
use crate::error::ActionError;
use crate::events::GenericEvent;

/// Target of `service::method` calls.
///
/// Methods are dispatched by name, the event is the sole argument.
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Invokes `method` with the triggering event.
    async fn call(&self, method: &str, event: &GenericEvent) -> Result<(), ActionError>;

    /// Whether `method` can be invoked. The registry checks this before `call`.
    fn has_method(&self, method: &str) -> bool {
        let _ = method;
        true
    }
}

/// Storage backing an object definition.
#[async_trait]
pub trait Storage: Send + Sync + 'static {
    /// Binds the storage to the object it serves.
    async fn configure(&self, object_key: &str, object: &ObjectDefinition)
        -> Result<(), ActionError>;

    /// Drops every cached entry of the configured object.
    async fn clear_cache(&self) -> Result<(), ActionError>;
}

/// Resolves services and storages by name.
pub trait ServiceLocator: Send + Sync + 'static {
    /// True if a service or storage is registered under `name`.
    ///
    /// Used to check object storages when services are validated on reload.
    fn has(&self, name: &str) -> bool;

    /// Returns the service registered under `name`.
    fn service(&self, name: &str) -> Option<Arc<dyn Service>>;

    /// Returns the storage registered under `name`.
    fn storage(&self, name: &str) -> Option<Arc<dyn Storage>>;
}

/// In-memory [`ServiceLocator`].
#[derive(Clone, Default)]
pub struct Container {
    services: HashMap<String, Arc<dyn Service>>,
    storages: HashMap<String, Arc<dyn Storage>>,
}

impl Container {
    /// Creates an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a service.
    pub fn with_service(mut self, name: impl Into<String>, service: Arc<dyn Service>) -> Self {
        self.services.insert(name.into(), service);
        self
    }

    /// Registers (or replaces) a storage.
    pub fn with_storage(mut self, name: impl Into<String>, storage: Arc<dyn Storage>) -> Self {
        self.storages.insert(name.into(), storage);
        self
    }
}

impl ServiceLocator for Container {
    fn has(&self, name: &str) -> bool {
        self.services.contains_key(name) || self.storages.contains_key(name)
    }

    fn service(&self, name: &str) -> Option<Arc<dyn Service>> {
        self.services.get(name).cloned()
    }

    fn storage(&self, name: &str) -> Option<Arc<dyn Storage>> {
        self.storages.get(name).cloned()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut services: Vec<&String> = self.services.keys().collect();
        let mut storages: Vec<&String> = self.storages.keys().collect();
        services.sort_unstable();
        storages.sort_unstable();
        f.debug_struct("Container")
            .field("services", &services)
            .field("storages", &storages)
            .finish()
    }
}
