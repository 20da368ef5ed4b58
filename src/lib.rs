//! # hookbind
//!
//! **hookbind** binds configuration-declared listener rules to a named-channel
//! event bus.
//!
//! Bundles declare rules ("when `core/object/modify` fires for subject
//! `page` and `published == true`, clear `core/navigation` and call
//! `search.indexer::reindex`"). The [`BindingRegistry`] turns every rule of a
//! configuration snapshot into one live bus subscription, and rebuilds the whole
//! set on each reload.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │ BundleConfig │   │ BundleConfig │   │ BundleConfig │
//!     │  listeners   │   │  listeners   │   │   objects    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  BindingRegistry                                                  │
//! │  - attached set (key, rule, listener id)                          │
//! │  - Dispatcher (condition operator, cacher, service locator)       │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!   BindingListener    BindingListener    BindingListener (object-modify)
//!        │                  │                  │
//!        ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                  EventBus (ordered listeners per channel)         │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! register_from_config(snapshot)
//!   ├─► detach_events()                       (previous snapshot fully removed)
//!   └─► for bundle in snapshot:
//!         ├─► attach_event(listener rule)     (one subscription each)
//!         └─► attach_event(object-modify rule, subject = object key)
//!
//! bus.dispatch(channel, event)
//!   └─► BindingListener
//!         ├─ subject set and differs ─► skip
//!         ├─ condition unsatisfied   ─► skip
//!         └─ call: calls ─► clear_caches ─► service_calls   (first error aborts)
//! ```
//!
//! ## Features
//! | Area              | Description                                                   | Key types / traits                          |
//! |-------------------|---------------------------------------------------------------|---------------------------------------------|
//! | **Registry**      | Attach, reload and detach configuration-declared bindings.    | [`BindingRegistry`], [`AttachedEvent`]      |
//! | **Rules**         | Channel, filters and ordered actions of one binding.          | [`BindingRule`], [`Call`], [`ServiceCall`]  |
//! | **Bus**           | Named channels, ordered listeners, removable handles.         | [`EventBus`], [`Listener`], [`ListenerId`]  |
//! | **Collaborators** | Conditions, cache invalidation, service and storage lookup.   | [`ConditionOperator`], [`ServiceLocator`]   |
//! | **Errors**        | Typed errors for configuration and dispatch.                  | [`ConfigError`], [`DispatchError`]          |
//! | **Configuration** | Snapshot model and registry settings.                         | [`Configs`], [`DispatcherConfig`]           |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use hookbind::{
//!     ActionError, BindingRegistry, BindingRule, BundleConfig, CallFn, Configs, EventBus,
//!     GenericEvent, InvalidationStore,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = EventBus::new();
//!     let caches = Arc::new(InvalidationStore::new());
//!     let registry = BindingRegistry::builder(bus.clone())
//!         .cacher(caches.clone())
//!         .build();
//!
//!     let rule = BindingRule::builder("core/object/modify")
//!         .subject("page")
//!         .condition("published == true")
//!         .call(CallFn::arc("log", |ev: &GenericEvent| {
//!             println!("page {:?} modified", ev.argument("id"));
//!             Ok::<_, ActionError>(())
//!         }))
//!         .clear_cache("core/navigation")
//!         .build()?;
//!
//!     registry
//!         .register_from_config(&Configs::new(vec![BundleConfig::new("cms").with_listener(rule)]))
//!         .await?;
//!
//!     let event = GenericEvent::new()
//!         .with_subject("page")
//!         .with_argument("id", 7)
//!         .with_argument("published", true);
//!     bus.dispatch("core/object/modify", &event).await?;
//!
//!     assert!(caches.invalidated_at("core/navigation").await.is_some());
//!     Ok(())
//! }
//! ```
mod config;
mod configuration;
mod core;
mod error;
mod events;
mod rules;
mod services;

// ---- Public re-exports ----

pub use config::{DispatcherConfig, MissingServicePolicy, OBJECT_MODIFY_KEY};
pub use configuration::{BundleConfig, Configs, ObjectDefinition};
pub use self::core::{AttachedEvent, BindingRegistry, BindingRegistryBuilder};
pub use error::{ActionError, ConditionError, ConfigError, DispatchError};
pub use events::{Arguments, EventBus, GenericEvent, Listener, ListenerId};
pub use rules::{BindingRule, BindingRuleBuilder, Call, CallFn, CallRef, ServiceCall};
pub use services::{
    CacheInvalidator, ComparisonOperator, ConditionOperator, Container, InvalidationStore,
    Service, ServiceLocator, Storage,
};
