//! # Bus listener trait.
//!
//! Provides [`Listener`], the handler type stored per channel in the
//! [`EventBus`](crate::EventBus).
//!
//! ## Rules
//! - Listeners of one channel run sequentially, in registration order.
//! - Returning an error aborts the remaining listeners of that dispatch.
//! - A panic is caught by the bus and reported as
//!   [`DispatchError::ListenerPanicked`](crate::DispatchError::ListenerPanicked).

use async_trait::async_trait;

use crate::error::DispatchError;

use super::GenericEvent;

/// Handler subscribed to a bus channel.
#[async_trait]
pub trait Listener: Send + Sync + 'static {
    /// Handles one event published on the channel this listener is attached to.
    async fn handle(&self, event: &GenericEvent) -> Result<(), DispatchError>;

    /// Returns the listener name used in logs and panic reports.
    ///
    /// The default uses `type_name::<Self>()`, which can be verbose - override it when possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}
