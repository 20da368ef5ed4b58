//! # Storage cache clearing for modified objects.
//!
//! For every [`ObjectDefinition`] in a snapshot the registry attaches a rule on
//! the object-modify channel, with the object key as subject and one
//! [`ObjectCacheClear`] call:
//!
//! ```text
//! dispatch("core/object/modify", subject = "article")
//!   └─► ObjectCacheClear { object: article }
//!         ├─► locator.storage("article.storage")
//!         ├─► storage.configure("article", &object)
//!         └─► storage.clear_cache()
//! ```
//!
//! The storage is resolved on every event; a missing storage fails the dispatch.

use std::sync::Arc;

use async_trait::async_trait;

use crate::configuration::ObjectDefinition;
use crate::error::{ActionError, DispatchError};
use crate::events::GenericEvent;
use crate::rules::Call;
use crate::services::ServiceLocator;

/// Call that clears the storage caches of one object.
pub(crate) struct ObjectCacheClear {
    name: String,
    object: ObjectDefinition,
    locator: Arc<dyn ServiceLocator>,
}

impl ObjectCacheClear {
    pub(crate) fn new(object: ObjectDefinition, locator: Arc<dyn ServiceLocator>) -> Self {
        Self {
            name: format!("clear-storage-cache:{}", object.key),
            object,
            locator,
        }
    }

    fn storage_error(&self, source: ActionError) -> DispatchError {
        DispatchError::Storage {
            service: self.object.storage_service.clone(),
            object: self.object.key.clone(),
            source,
        }
    }
}

#[async_trait]
impl Call for ObjectCacheClear {
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, _event: &GenericEvent) -> Result<(), DispatchError> {
        let storage = self
            .locator
            .storage(&self.object.storage_service)
            .ok_or_else(|| DispatchError::StorageNotFound {
                service: self.object.storage_service.clone(),
                object: self.object.key.clone(),
            })?;

        storage
            .configure(&self.object.key, &self.object)
            .await
            .map_err(|e| self.storage_error(e))?;
        storage.clear_cache().await.map_err(|e| self.storage_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::{Container, Storage};
    use std::sync::Mutex;

    struct BrokenStorage;

    #[async_trait]
    impl Storage for BrokenStorage {
        async fn configure(&self, _key: &str, _object: &ObjectDefinition) -> Result<(), ActionError> {
            Ok(())
        }

        async fn clear_cache(&self) -> Result<(), ActionError> {
            Err(ActionError::fail("disk full"))
        }
    }

    #[derive(Default)]
    struct Recording(Mutex<Vec<String>>);

    #[async_trait]
    impl Storage for Recording {
        async fn configure(&self, key: &str, object: &ObjectDefinition) -> Result<(), ActionError> {
            self.0
                .lock()
                .unwrap()
                .push(format!("configure:{key}:{}", object.storage_service));
            Ok(())
        }

        async fn clear_cache(&self) -> Result<(), ActionError> {
            self.0.lock().unwrap().push("clear".into());
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_configures_then_clears() {
        let storage = Arc::new(Recording::default());
        let locator = Arc::new(Container::new().with_storage("page.storage", storage.clone()));
        let call = ObjectCacheClear::new(ObjectDefinition::new("page", "page.storage"), locator);

        assert_eq!(call.name(), "clear-storage-cache:page");
        call.invoke(&GenericEvent::new()).await.unwrap();
        assert_eq!(
            *storage.0.lock().unwrap(),
            vec!["configure:page:page.storage", "clear"]
        );
    }

    #[tokio::test]
    async fn test_missing_storage_fails() {
        let call = ObjectCacheClear::new(
            ObjectDefinition::new("page", "page.storage"),
            Arc::new(Container::new()),
        );
        let err = call.invoke(&GenericEvent::new()).await.unwrap_err();
        assert_eq!(err.as_label(), "dispatch_storage_not_found");
    }

    #[tokio::test]
    async fn test_storage_failure_names_object() {
        let locator = Arc::new(Container::new().with_storage("s", Arc::new(BrokenStorage)));
        let call = ObjectCacheClear::new(ObjectDefinition::new("page", "s"), locator);
        let err = call.invoke(&GenericEvent::new()).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "storage \"s\" for object \"page\" failed: action failed: disk full"
        );
    }
}
