//! Bus listener wrapping one binding rule.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::DispatchError;
use crate::events::{GenericEvent, Listener};
use crate::rules::BindingRule;

use super::dispatch::Dispatcher;

/// Subscribed once per attached rule: filters, then runs the rule's actions.
pub(crate) struct BindingListener {
    name: String,
    rule: Arc<BindingRule>,
    dispatcher: Arc<Dispatcher>,
}

impl BindingListener {
    pub(crate) fn new(rule: Arc<BindingRule>, dispatcher: Arc<Dispatcher>) -> Self {
        let name = match rule.subject() {
            Some(subject) => format!("binding:{}[{subject}]", rule.key()),
            None => format!("binding:{}", rule.key()),
        };
        Self {
            name,
            rule,
            dispatcher,
        }
    }
}

#[async_trait]
impl Listener for BindingListener {
    async fn handle(&self, event: &GenericEvent) -> Result<(), DispatchError> {
        if self.dispatcher.is_callable(&self.rule, event)? {
            self.dispatcher.call(&self.rule, event).await?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
