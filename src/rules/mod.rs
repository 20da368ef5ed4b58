//! Binding rules and the actions they carry.
//!
//! - [`BindingRule`] + [`BindingRuleBuilder`]: channel, filters and actions of one binding;
//! - [`Call`], [`CallFn`], [`CallRef`]: closure-like actions run first;
//! - [`ServiceCall`]: `service::method` references run last.

mod call;
mod rule;
mod service_call;

pub use call::{Call, CallFn, CallRef};
pub use rule::{BindingRule, BindingRuleBuilder};
pub use service_call::ServiceCall;
