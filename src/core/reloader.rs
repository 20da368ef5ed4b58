//! # Configuration reloader.
//!
//! Applies every configuration snapshot published on a `watch` channel to a
//! [`BindingRegistry`].
//!
//! ```text
//! watch::Sender<Arc<Configs>> ── send(snapshot) ──► reloader task
//!                                                    ├─► register_from_config(snapshot)
//!                                                    │     └─ Err ─► warn!, keep running
//!                                                    └─ token cancelled / sender dropped
//!                                                          └─► detach_events(), exit
//! ```
//!
//! Snapshots are applied one at a time; intermediate snapshots published
//! while a reload runs are coalesced into the latest one.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::configuration::Configs;

use super::registry::BindingRegistry;

impl BindingRegistry {
    /// Spawns the task that keeps this registry in sync with `snapshots`.
    ///
    /// The current value of the channel is applied immediately. The task ends
    /// when `token` is cancelled or every sender is dropped, detaching all
    /// bindings on the way out.
    pub fn spawn_reloader(
        self: Arc<Self>,
        mut snapshots: watch::Receiver<Arc<Configs>>,
        token: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let initial = Arc::clone(&snapshots.borrow_and_update());
            self.reload(&initial).await;

            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    changed = snapshots.changed() => match changed {
                        Ok(()) => {
                            let next = Arc::clone(&snapshots.borrow_and_update());
                            self.reload(&next).await;
                        }
                        Err(_) => break,
                    }
                }
            }

            self.detach_events().await;
            debug!("reloader stopped");
        })
    }

    async fn reload(&self, configs: &Configs) {
        if let Err(e) = self.register_from_config(configs).await {
            warn!(error = %e, label = e.as_label(), "configuration reload failed");
        }
    }
}
