//! # Binding registry - configuration-driven listener lifecycle.
//!
//! The registry owns the set of bus subscriptions derived from configuration:
//! - `register_from_config(snapshot)` → detach everything, attach every declared rule
//! - `attach_event(rule)` → one validated rule, one new subscription
//! - `detach_events()` → remove every subscription it made, leave the set empty
//!
//! ## Architecture
//! ```text
//! Configs ──► register_from_config
//!               ├─► detach_events()          (bus.remove_listener per binding)
//!               ├─► bundle.listeners ──► attach_event(rule)
//!               └─► bundle.objects   ──► attach_event(object-modify rule)
//!                                           └─► bus.add_listener(key, BindingListener)
//!
//! bus.dispatch(key, event) ──► BindingListener ──► is_callable ──► call
//! ```
//!
//! ## Rules
//! - Registry owns the attached set; nothing else mutates it.
//! - Reloads and teardowns are serialized by the registry lock; dispatch never takes it.
//! - A reload is detach-then-attach: events published mid-reload may find no bindings.
//! - Errors are never swallowed: attach errors abort a reload, dispatch errors reach the publisher.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::configuration::Configs;
use crate::error::{ConfigError, DispatchError};
use crate::events::{EventBus, GenericEvent, ListenerId};
use crate::rules::BindingRule;

use super::builder::BindingRegistryBuilder;
use super::dispatch::Dispatcher;
use super::listener::BindingListener;
use super::object_cache::ObjectCacheClear;

/// One live binding: a rule and the bus subscription made for it.
#[derive(Clone, Debug)]
pub struct AttachedEvent {
    /// Channel the rule is subscribed to.
    pub key: String,
    /// The attached rule.
    pub rule: Arc<BindingRule>,
    /// Bus handle of the subscription.
    pub listener: ListenerId,
}

/// Binds configuration-declared rules to an [`EventBus`].
pub struct BindingRegistry {
    bus: EventBus,
    dispatcher: Arc<Dispatcher>,
    attached: Mutex<Vec<AttachedEvent>>,
}

impl BindingRegistry {
    /// Starts building a registry for `bus`.
    pub fn builder(bus: EventBus) -> BindingRegistryBuilder {
        BindingRegistryBuilder::new(bus)
    }

    pub(crate) fn new(bus: EventBus, dispatcher: Arc<Dispatcher>) -> Arc<Self> {
        Arc::new(Self {
            bus,
            dispatcher,
            attached: Mutex::new(Vec::new()),
        })
    }

    /// The bus bindings are attached to.
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Replaces every binding with the ones declared in `configs`.
    ///
    /// Per bundle, in order: its listener rules, then one object-modify rule per
    /// object definition. The first attach error stops the reload and is
    /// returned; bindings attached before it stay attached.
    pub async fn register_from_config(&self, configs: &Configs) -> Result<(), ConfigError> {
        let mut attached = self.attached.lock().await;
        self.detach_locked(&mut attached).await;

        for bundle in configs.bundles() {
            for rule in bundle.listeners() {
                self.attach_locked(&mut attached, rule.clone()).await?;
            }

            for object in bundle.objects() {
                let key = self.dispatcher.config.object_modify_key.as_str();
                if self.dispatcher.config.validate_services
                    && !self.dispatcher.locator.has(&object.storage_service)
                {
                    return Err(ConfigError::MissingService {
                        key: key.to_string(),
                        service: object.storage_service.clone(),
                    });
                }

                let clear = ObjectCacheClear::new(object.clone(), self.dispatcher.locator.clone());
                let rule = BindingRule::builder(key)
                    .subject(object.key.as_str())
                    .call(Arc::new(clear))
                    .build()?;
                self.attach_locked(&mut attached, rule).await?;
            }
        }

        info!(
            bundles = configs.bundles().len(),
            bindings = attached.len(),
            "bindings registered"
        );
        Ok(())
    }

    /// Validates `rule` and subscribes it to the bus under its key.
    pub async fn attach_event(&self, rule: BindingRule) -> Result<ListenerId, ConfigError> {
        let mut attached = self.attached.lock().await;
        self.attach_locked(&mut attached, rule).await
    }

    /// Runs the actions of `rule` for `event`, without filtering.
    pub async fn call(&self, rule: &BindingRule, event: &GenericEvent) -> Result<(), DispatchError> {
        self.dispatcher.call(rule, event).await
    }

    /// Checks whether `rule` applies to `event` (subject fits, condition fits).
    pub fn is_callable(&self, rule: &BindingRule, event: &GenericEvent) -> Result<bool, DispatchError> {
        self.dispatcher.is_callable(rule, event)
    }

    /// Removes every subscription made by this registry. No-op when empty.
    pub async fn detach_events(&self) {
        let mut attached = self.attached.lock().await;
        self.detach_locked(&mut attached).await;
    }

    /// Returns the live bindings, in attach order.
    pub async fn attached_events(&self) -> Vec<AttachedEvent> {
        self.attached.lock().await.clone()
    }

    /// Number of live bindings.
    pub async fn len(&self) -> usize {
        self.attached.lock().await.len()
    }

    /// True if nothing is attached.
    pub async fn is_empty(&self) -> bool {
        self.attached.lock().await.is_empty()
    }

    // ---------------------------
    // Helpers (lock held by caller)
    // ---------------------------

    async fn attach_locked(
        &self,
        attached: &mut Vec<AttachedEvent>,
        rule: BindingRule,
    ) -> Result<ListenerId, ConfigError> {
        self.validate(&rule)?;

        let rule = Arc::new(rule);
        let listener = BindingListener::new(Arc::clone(&rule), Arc::clone(&self.dispatcher));
        let id = self.bus.add_listener(rule.key(), Arc::new(listener)).await;
        debug!(key = rule.key(), subject = rule.subject(), %id, "binding attached");

        attached.push(AttachedEvent {
            key: rule.key().to_string(),
            rule,
            listener: id,
        });
        Ok(id)
    }

    async fn detach_locked(&self, attached: &mut Vec<AttachedEvent>) {
        if attached.is_empty() {
            return;
        }
        let count = attached.len();
        for binding in attached.drain(..) {
            self.bus.remove_listener(&binding.key, binding.listener).await;
        }
        debug!(count, "bindings detached");
    }

    fn validate(&self, rule: &BindingRule) -> Result<(), ConfigError> {
        if let Some(condition) = rule.condition() {
            self.dispatcher
                .condition
                .validate(condition)
                .map_err(|source| ConfigError::InvalidCondition {
                    key: rule.key().to_string(),
                    condition: condition.to_string(),
                    source,
                })?;
        }

        if self.dispatcher.config.validate_services {
            for call in rule.service_calls() {
                let service = self.dispatcher.locator.service(call.service()).ok_or_else(|| {
                    ConfigError::MissingService {
                        key: rule.key().to_string(),
                        service: call.service().to_string(),
                    }
                })?;
                if !service.has_method(call.method()) {
                    return Err(ConfigError::MissingMethod {
                        key: rule.key().to_string(),
                        service: call.service().to_string(),
                        method: call.method().to_string(),
                    });
                }
            }
        }

        Ok(())
    }
}
