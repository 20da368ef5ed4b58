//! # Registry configuration.
//!
//! Provides [`DispatcherConfig`] centralized settings for the
//! [`BindingRegistry`](crate::BindingRegistry).
//!
//! Config is used in two places:
//! 1. **Attach time**: channel of synthesized object bindings, service validation
//! 2. **Dispatch time**: what to do when a service call names an unknown service

/// Channel on which object modifications are published.
pub const OBJECT_MODIFY_KEY: &str = "core/object/modify";

/// What a service call does when its service is not registered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MissingServicePolicy {
    /// Abort the dispatch with [`DispatchError::ServiceNotFound`](crate::DispatchError::ServiceNotFound).
    #[default]
    Fail,
    /// Log a warning and continue with the next service call.
    Skip,
}

/// Configuration for the binding registry.
///
/// ## Field semantics
/// - `object_modify_key`: channel of the bindings synthesized per object definition
/// - `missing_service`: dispatch behavior for service calls to unregistered services
/// - `validate_services`: check service calls and object storages against the locator when attaching
#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    /// Channel the per-object cache-clear bindings subscribe to.
    pub object_modify_key: String,

    /// Behavior of a service call whose service cannot be located.
    pub missing_service: MissingServicePolicy,

    /// Whether `attach_event` rejects rules whose service calls cannot be resolved,
    /// and `register_from_config` rejects objects whose storage is not registered.
    ///
    /// Off by default: services may be registered after the bindings.
    pub validate_services: bool,
}

impl Default for DispatcherConfig {
    /// Default configuration:
    ///
    /// - `object_modify_key = "core/object/modify"`
    /// - `missing_service = MissingServicePolicy::Fail`
    /// - `validate_services = false`
    fn default() -> Self {
        Self {
            object_modify_key: OBJECT_MODIFY_KEY.to_string(),
            missing_service: MissingServicePolicy::default(),
            validate_services: false,
        }
    }
}
