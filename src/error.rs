//! Error types used by the binding registry, its actions and collaborators.
//!
//! This module defines four enums:
//!
//! - [`ConfigError`] — errors raised while turning configuration into live bindings.
//! - [`DispatchError`] — errors raised while a fired event runs a binding's actions.
//! - [`ActionError`] — errors raised by user actions (calls, services, storages, caches).
//! - [`ConditionError`] — errors raised while parsing or evaluating a condition.
//!
//! Every type provides `as_label` (stable snake_case label for logs).
//! Nothing here is retried: errors surface to whoever attached or published.

use thiserror::Error;

/// # Errors produced by user actions.
///
/// Returned by [`Call`](crate::Call), [`Service`](crate::Service),
/// [`Storage`](crate::Storage) and [`CacheInvalidator`](crate::CacheInvalidator)
/// implementations.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// The action failed.
    #[error("action failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },
}

impl ActionError {
    /// Shorthand for [`ActionError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        ActionError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ActionError::Fail { .. } => "action_failed",
        }
    }
}

/// # Errors produced by condition expressions.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConditionError {
    /// The expression is empty or whitespace only.
    #[error("empty condition")]
    Empty,

    /// The expression could not be parsed.
    #[error("invalid condition at offset {position}: {reason}")]
    Syntax {
        /// Byte offset into the expression where parsing failed.
        position: usize,
        /// What was expected or found.
        reason: String,
    },
}

impl ConditionError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConditionError::Empty => "condition_empty",
            ConditionError::Syntax { .. } => "condition_syntax",
        }
    }
}

/// # Errors produced while loading configuration or attaching bindings.
///
/// These are configuration mistakes; they are surfaced to the caller of
/// [`BindingRegistry::register_from_config`](crate::BindingRegistry::register_from_config)
/// or [`BindingRegistry::attach_event`](crate::BindingRegistry::attach_event).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A binding rule without channel key.
    #[error("binding rule has an empty key")]
    EmptyKey,

    /// A service call not written as `service::method`.
    #[error("malformed service call {value:?}; expected `service::method`")]
    MalformedServiceCall {
        /// The offending configuration value.
        value: String,
    },

    /// A rule condition that does not parse.
    #[error("invalid condition {condition:?} on {key:?}: {source}")]
    InvalidCondition {
        /// Channel key of the rule.
        key: String,
        /// The condition expression.
        condition: String,
        /// Parser error.
        #[source]
        source: ConditionError,
    },

    /// A service call names a service the locator does not know.
    #[error("service {service:?} referenced by {key:?} is not registered")]
    MissingService {
        /// Channel key of the rule.
        key: String,
        /// Service name.
        service: String,
    },

    /// A service call names a method the service does not expose.
    #[error("service {service:?} has no method {method:?} (referenced by {key:?})")]
    MissingMethod {
        /// Channel key of the rule.
        key: String,
        /// Service name.
        service: String,
        /// Method name.
        method: String,
    },

    /// The serialized configuration could not be decoded.
    #[error("configuration parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::EmptyKey => "config_empty_key",
            ConfigError::MalformedServiceCall { .. } => "config_malformed_service_call",
            ConfigError::InvalidCondition { .. } => "config_invalid_condition",
            ConfigError::MissingService { .. } => "config_missing_service",
            ConfigError::MissingMethod { .. } => "config_missing_method",
            ConfigError::Parse(_) => "config_parse",
        }
    }
}

/// # Errors produced while dispatching an event to a binding.
///
/// The first error aborts the remaining actions of the event: actions that
/// already ran are not rolled back.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A call action failed.
    #[error("call {name:?} failed: {source}")]
    Call {
        /// Call name.
        name: String,
        /// Action error.
        #[source]
        source: ActionError,
    },

    /// Invalidating a cache key failed.
    #[error("invalidating cache {key:?} failed: {source}")]
    CacheInvalidation {
        /// Cache key.
        key: String,
        /// Action error.
        #[source]
        source: ActionError,
    },

    /// The locator has no service with this name.
    #[error("service {service:?} not found")]
    ServiceNotFound {
        /// Service name.
        service: String,
    },

    /// The service does not expose the method.
    #[error("service {service:?} has no method {method:?}")]
    UnknownMethod {
        /// Service name.
        service: String,
        /// Method name.
        method: String,
    },

    /// A service method failed.
    #[error("service call {service}::{method} failed: {source}")]
    ServiceCall {
        /// Service name.
        service: String,
        /// Method name.
        method: String,
        /// Action error.
        #[source]
        source: ActionError,
    },

    /// The locator has no storage with this name.
    #[error("storage service {service:?} for object {object:?} not found")]
    StorageNotFound {
        /// Storage service name.
        service: String,
        /// Object key.
        object: String,
    },

    /// A storage failed to configure or clear its cache.
    #[error("storage {service:?} for object {object:?} failed: {source}")]
    Storage {
        /// Storage service name.
        service: String,
        /// Object key.
        object: String,
        /// Action error.
        #[source]
        source: ActionError,
    },

    /// A condition failed to evaluate.
    #[error("condition {condition:?} failed: {source}")]
    Condition {
        /// The condition expression.
        condition: String,
        /// Evaluation error.
        #[source]
        source: ConditionError,
    },

    /// A listener panicked while handling the event.
    #[error("listener {listener:?} on {channel:?} panicked: {reason}")]
    ListenerPanicked {
        /// Channel name.
        channel: String,
        /// Listener name.
        listener: String,
        /// Panic payload, when it was a string.
        reason: String,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use hookbind::DispatchError;
    ///
    /// let err = DispatchError::ServiceNotFound { service: "mailer".into() };
    /// assert_eq!(err.as_label(), "dispatch_service_not_found");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::Call { .. } => "dispatch_call_failed",
            DispatchError::CacheInvalidation { .. } => "dispatch_cache_invalidation_failed",
            DispatchError::ServiceNotFound { .. } => "dispatch_service_not_found",
            DispatchError::UnknownMethod { .. } => "dispatch_unknown_method",
            DispatchError::ServiceCall { .. } => "dispatch_service_call_failed",
            DispatchError::StorageNotFound { .. } => "dispatch_storage_not_found",
            DispatchError::Storage { .. } => "dispatch_storage_failed",
            DispatchError::Condition { .. } => "dispatch_condition_failed",
            DispatchError::ListenerPanicked { .. } => "dispatch_listener_panicked",
        }
    }
}
