//! # Registry builder.
//!
//! Assembles a [`BindingRegistry`] from an [`EventBus`] and optional
//! collaborators; anything left unset falls back to an in-memory default.
//!
//! ```text
//! BindingRegistry::builder(bus)
//!   .condition_operator(..) .cacher(..) .locator(..) .config(..)
//!   .build() ──► Arc<BindingRegistry>
//! ```

use std::sync::Arc;

use crate::{
    config::DispatcherConfig,
    events::EventBus,
    services::{
        CacheInvalidator, ComparisonOperator, ConditionOperator, Container, InvalidationStore,
        ServiceLocator,
    },
};
use super::{dispatch::Dispatcher, registry::BindingRegistry};

/// Builder for constructing a [`BindingRegistry`] with its collaborators.
///
/// Every collaborator has an in-memory default:
/// - condition operator: [`ComparisonOperator`]
/// - cacher: [`InvalidationStore`]
/// - locator: empty [`Container`]
/// - config: [`DispatcherConfig::default`]
pub struct BindingRegistryBuilder {
    bus: EventBus,
    condition: Option<Arc<dyn ConditionOperator>>,
    cacher: Option<Arc<dyn CacheInvalidator>>,
    locator: Option<Arc<dyn ServiceLocator>>,
    config: DispatcherConfig,
}

impl BindingRegistryBuilder {
    /// Creates a new builder for a registry subscribing to `bus`.
    pub fn new(bus: EventBus) -> Self {
        Self {
            bus,
            condition: None,
            cacher: None,
            locator: None,
            config: DispatcherConfig::default(),
        }
    }

    /// Sets the evaluator of rule conditions.
    pub fn condition_operator(mut self, condition: Arc<dyn ConditionOperator>) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Sets the target of `clear_caches` actions.
    pub fn cacher(mut self, cacher: Arc<dyn CacheInvalidator>) -> Self {
        self.cacher = Some(cacher);
        self
    }

    /// Sets where services and object storages are resolved.
    pub fn locator(mut self, locator: Arc<dyn ServiceLocator>) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Sets the registry configuration.
    pub fn config(mut self, config: DispatcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds the registry. It starts empty: nothing is attached yet.
    pub fn build(self) -> Arc<BindingRegistry> {
        let condition: Arc<dyn ConditionOperator> = match self.condition {
            Some(condition) => condition,
            None => Arc::new(ComparisonOperator),
        };
        let cacher: Arc<dyn CacheInvalidator> = match self.cacher {
            Some(cacher) => cacher,
            None => Arc::new(InvalidationStore::new()),
        };
        let locator: Arc<dyn ServiceLocator> = match self.locator {
            Some(locator) => locator,
            None => Arc::new(Container::new()),
        };

        let dispatcher = Dispatcher {
            condition,
            cacher,
            locator,
            config: self.config,
        };
        BindingRegistry::new(self.bus, Arc::new(dispatcher))
    }
}
