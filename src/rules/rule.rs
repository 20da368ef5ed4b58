//! # Binding rules.
//!
//! A [`BindingRule`] is the configuration entity behind one binding: the
//! channel it listens on, the optional subject/condition filters and the
//! actions to run on match. Rules are immutable once built; a changed rule is
//! represented by a reload, never by patching a live one.
//!
//! ## Action order
//! ```text
//! calls (in order) ──► clear_caches (in order) ──► service_calls (in order)
//! ```
//!
//! ## Example
//! ```rust
//! use hookbind::{ActionError, BindingRule, CallFn, GenericEvent};
//!
//! let rule = BindingRule::builder("core/object/modify")
//!     .subject("article")
//!     .condition("status == \"published\"")
//!     .call(CallFn::arc("log", |_ev: &GenericEvent| Ok::<_, ActionError>(())))
//!     .clear_cache("core/navigation")
//!     .service_call("search.indexer::reindex")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(rule.key(), "core/object/modify");
//! assert_eq!(rule.service_calls().len(), 1);
//! ```

use serde::Deserialize;

use crate::error::ConfigError;

use super::{CallRef, ServiceCall};

/// Configuration-declared listener rule.
#[derive(Clone, Debug, Deserialize)]
#[serde(try_from = "RawRule")]
pub struct BindingRule {
    key: String,
    subject: Option<String>,
    condition: Option<String>,
    calls: Vec<CallRef>,
    clear_caches: Vec<String>,
    service_calls: Vec<ServiceCall>,
}

impl BindingRule {
    /// Starts a rule listening on `key`.
    pub fn builder(key: impl Into<String>) -> BindingRuleBuilder {
        BindingRuleBuilder {
            key: key.into(),
            subject: None,
            condition: None,
            calls: Vec::new(),
            clear_caches: Vec::new(),
            service_calls: Vec::new(),
        }
    }

    /// Channel the rule subscribes to.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Exact-match subject filter.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Condition evaluated against the event arguments.
    pub fn condition(&self) -> Option<&str> {
        self.condition.as_deref()
    }

    /// Call actions, first to run.
    pub fn calls(&self) -> &[CallRef] {
        &self.calls
    }

    /// Cache keys to invalidate, after the calls.
    pub fn clear_caches(&self) -> &[String] {
        &self.clear_caches
    }

    /// Service methods to invoke, last.
    pub fn service_calls(&self) -> &[ServiceCall] {
        &self.service_calls
    }
}

/// Builder for [`BindingRule`].
///
/// Service calls are kept as written until [`build`](Self::build), which
/// reports the first malformed one.
pub struct BindingRuleBuilder {
    key: String,
    subject: Option<String>,
    condition: Option<String>,
    calls: Vec<CallRef>,
    clear_caches: Vec<String>,
    service_calls: Vec<String>,
}

impl BindingRuleBuilder {
    /// Restricts the rule to events with exactly this subject.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Restricts the rule to events whose arguments satisfy `condition`.
    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }

    /// Appends a call action.
    pub fn call(mut self, call: CallRef) -> Self {
        self.calls.push(call);
        self
    }

    /// Appends a cache key to invalidate.
    pub fn clear_cache(mut self, key: impl Into<String>) -> Self {
        self.clear_caches.push(key.into());
        self
    }

    /// Appends a service call written as `service::method`.
    pub fn service_call(mut self, notation: impl Into<String>) -> Self {
        self.service_calls.push(notation.into());
        self
    }

    /// Validates and builds the rule.
    pub fn build(self) -> Result<BindingRule, ConfigError> {
        if self.key.trim().is_empty() {
            return Err(ConfigError::EmptyKey);
        }
        let service_calls = self
            .service_calls
            .iter()
            .map(|raw| raw.parse::<ServiceCall>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BindingRule {
            key: self.key,
            subject: non_blank_subject(self.subject),
            condition: non_blank_condition(self.condition),
            calls: self.calls,
            clear_caches: self.clear_caches,
            service_calls,
        })
    }
}

// An empty subject or blank condition means "no filter".
fn non_blank_subject(subject: Option<String>) -> Option<String> {
    subject.filter(|s| !s.is_empty())
}

fn non_blank_condition(condition: Option<String>) -> Option<String> {
    condition.filter(|c| !c.trim().is_empty())
}

/// Serialized form of a rule; closures cannot be expressed here.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawRule {
    key: String,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    condition: Option<String>,
    #[serde(default)]
    clear_caches: Vec<String>,
    #[serde(default)]
    service_calls: Vec<ServiceCall>,
}

impl TryFrom<RawRule> for BindingRule {
    type Error = ConfigError;

    fn try_from(raw: RawRule) -> Result<Self, Self::Error> {
        if raw.key.trim().is_empty() {
            return Err(ConfigError::EmptyKey);
        }
        Ok(BindingRule {
            key: raw.key,
            subject: non_blank_subject(raw.subject),
            condition: non_blank_condition(raw.condition),
            calls: Vec::new(),
            clear_caches: raw.clear_caches,
            service_calls: raw.service_calls,
        })
    }
}
