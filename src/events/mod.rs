//! Events: payload type, listener trait and the named-channel bus.
//!
//! ## Contents
//! - [`GenericEvent`] subject + arguments payload
//! - [`Listener`] handler trait stored per channel
//! - [`EventBus`], [`ListenerId`] ordered per-channel dispatch with removable handles
//!
//! ## Quick reference
//! - **Publishers**: application code calling `EventBus::dispatch`.
//! - **Consumers**: `BindingListener`s created by the registry, plus any custom [`Listener`].

mod bus;
mod event;
mod listener;

pub use bus::{EventBus, ListenerId};
pub use event::{Arguments, GenericEvent};
pub use listener::Listener;
