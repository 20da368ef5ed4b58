//! Registry core: binding lifecycle and dispatch.
//!
//! The only public API from this module is [`BindingRegistry`] (with its
//! builder and [`AttachedEvent`] view).
//!
//! Internal modules:
//! - [`registry`]: owns the attached set, reload and teardown;
//! - [`dispatch`]: subject/condition filtering and ordered action execution;
//! - [`listener`]: the bus listener created per attached rule;
//! - [`object_cache`]: storage cache clearing for modified objects;
//! - [`reloader`]: applies snapshots from a `watch` channel;
//! - [`builder`]: wires collaborators with in-memory defaults.

mod builder;
mod dispatch;
mod listener;
mod object_cache;
mod registry;
mod reloader;

pub use builder::BindingRegistryBuilder;
pub use registry::{AttachedEvent, BindingRegistry};
