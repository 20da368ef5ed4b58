//! # Call actions and the function-backed [`CallFn`].
//!
//! A [`Call`] is the first kind of action a binding runs when it matches.
//! [`CallFn`] wraps a plain closure so that code can attach ad-hoc behavior
//! to a rule without a dedicated type; its [`ActionError`]s surface as
//! [`DispatchError::Call`] carrying the call name.
//!
//! ## Example
//! ```rust
//! use hookbind::{ActionError, CallFn, CallRef, GenericEvent};
//!
//! let c: CallRef = CallFn::arc("audit", |ev: &GenericEvent| {
//!     let _ = ev.subject();
//!     Ok::<_, ActionError>(())
//! });
//!
//! assert_eq!(c.name(), "audit");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ActionError, DispatchError};
use crate::events::GenericEvent;

/// Shared handle to a call action.
pub type CallRef = Arc<dyn Call>;

/// Action invoked with the triggering event.
#[async_trait]
pub trait Call: Send + Sync + 'static {
    /// Returns a stable, human-readable name used in logs and errors.
    fn name(&self) -> &str;

    /// Runs the action. The event is the sole argument.
    async fn invoke(&self, event: &GenericEvent) -> Result<(), DispatchError>;
}

impl fmt::Debug for dyn Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Call").field(&self.name()).finish()
    }
}

/// Function-backed call.
pub struct CallFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> CallFn<F> {
    /// Creates a new function-backed call.
    ///
    /// Prefer [`CallFn::arc`] when you immediately need a [`CallRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the call and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F> Call for CallFn<F>
where
    F: Fn(&GenericEvent) -> Result<(), ActionError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, event: &GenericEvent) -> Result<(), DispatchError> {
        (self.f)(event).map_err(|source| DispatchError::Call {
            name: self.name.to_string(),
            source,
        })
    }
}
