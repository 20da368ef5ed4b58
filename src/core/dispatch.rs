//! # Rule filtering and action execution.
//!
//! [`Dispatcher`] holds the collaborators a fired binding needs and implements
//! the two halves of handling an event: [`Dispatcher::is_callable`] (does the
//! rule apply?) and [`Dispatcher::call`] (run its actions).
//!
//! ```text
//! event ──► is_callable(rule, event)
//!             ├─ subject set and != event.subject ─► skip
//!             ├─ condition set and not satisfied  ─► skip
//!             └─ otherwise ─► call(rule, event)
//!                               ├─► calls          (in order)
//!                               ├─► clear_caches   (in order)
//!                               └─► service_calls  (in order)
//! ```
//!
//! The first error aborts the remaining actions; nothing is rolled back.

use std::sync::Arc;

use tracing::{trace, warn};

use crate::config::{DispatcherConfig, MissingServicePolicy};
use crate::error::DispatchError;
use crate::events::GenericEvent;
use crate::rules::{BindingRule, ServiceCall};
use crate::services::{CacheInvalidator, ConditionOperator, ServiceLocator};

/// Collaborators shared by every binding of a registry.
pub(crate) struct Dispatcher {
    pub(crate) condition: Arc<dyn ConditionOperator>,
    pub(crate) cacher: Arc<dyn CacheInvalidator>,
    pub(crate) locator: Arc<dyn ServiceLocator>,
    pub(crate) config: DispatcherConfig,
}

impl Dispatcher {
    /// Checks whether `rule` applies to `event` (subject fits, condition fits).
    pub(crate) fn is_callable(
        &self,
        rule: &BindingRule,
        event: &GenericEvent,
    ) -> Result<bool, DispatchError> {
        if let Some(subject) = rule.subject() {
            if event.subject() != Some(subject) {
                return Ok(false);
            }
        }

        if let Some(condition) = rule.condition() {
            let satisfied = self
                .condition
                .satisfy(condition, &event.arguments)
                .map_err(|source| DispatchError::Condition {
                    condition: condition.to_string(),
                    source,
                })?;
            if !satisfied {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Runs the actions of `rule`: calls, then cache invalidations, then service calls.
    pub(crate) async fn call(
        &self,
        rule: &BindingRule,
        event: &GenericEvent,
    ) -> Result<(), DispatchError> {
        trace!(key = rule.key(), seq = event.seq, "running binding actions");

        for call in rule.calls() {
            call.invoke(event).await?;
        }

        for key in rule.clear_caches() {
            self.cacher
                .invalidate(key)
                .await
                .map_err(|source| DispatchError::CacheInvalidation {
                    key: key.clone(),
                    source,
                })?;
        }

        for service_call in rule.service_calls() {
            self.call_service(service_call, event).await?;
        }

        Ok(())
    }

    async fn call_service(
        &self,
        target: &ServiceCall,
        event: &GenericEvent,
    ) -> Result<(), DispatchError> {
        let Some(service) = self.locator.service(target.service()) else {
            return match self.config.missing_service {
                MissingServicePolicy::Fail => Err(DispatchError::ServiceNotFound {
                    service: target.service().to_string(),
                }),
                MissingServicePolicy::Skip => {
                    warn!(
                        service = target.service(),
                        method = target.method(),
                        "service not found, call skipped"
                    );
                    Ok(())
                }
            };
        };

        if !service.has_method(target.method()) {
            return Err(DispatchError::UnknownMethod {
                service: target.service().to_string(),
                method: target.method().to_string(),
            });
        }

        service
            .call(target.method(), event)
            .await
            .map_err(|source| DispatchError::ServiceCall {
                service: target.service().to_string(),
                method: target.method().to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ActionError;
    use crate::rules::CallFn;
    use crate::services::{ComparisonOperator, Container, InvalidationStore, Service};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Failing;

    #[async_trait]
    impl Service for Failing {
        async fn call(&self, _method: &str, _event: &GenericEvent) -> Result<(), ActionError> {
            Err(ActionError::fail("down"))
        }

        fn has_method(&self, method: &str) -> bool {
            method == "run"
        }
    }

    fn dispatcher(container: Container, missing_service: MissingServicePolicy) -> Dispatcher {
        Dispatcher {
            condition: Arc::new(ComparisonOperator),
            cacher: Arc::new(InvalidationStore::new()),
            locator: Arc::new(container),
            config: DispatcherConfig {
                missing_service,
                ..DispatcherConfig::default()
            },
        }
    }

    #[test]
    fn test_subject_mismatch_wins_over_condition() {
        let d = dispatcher(Container::new(), MissingServicePolicy::Fail);
        let rule = BindingRule::builder("k")
            .subject("page")
            .condition("x > 5")
            .build()
            .unwrap();
        let ev = GenericEvent::new().with_subject("article").with_argument("x", 10);
        assert!(!d.is_callable(&rule, &ev).unwrap());

        let unnamed = GenericEvent::new().with_argument("x", 10);
        assert!(!d.is_callable(&rule, &unnamed).unwrap());
    }

    #[test]
    fn test_no_filters_always_match() {
        let d = dispatcher(Container::new(), MissingServicePolicy::Fail);
        let rule = BindingRule::builder("k").build().unwrap();
        assert!(d.is_callable(&rule, &GenericEvent::new()).unwrap());
        assert!(d
            .is_callable(&rule, &GenericEvent::new().with_subject("anything"))
            .unwrap());
    }

    #[test]
    fn test_condition_uses_empty_arguments() {
        let d = dispatcher(Container::new(), MissingServicePolicy::Fail);
        let rule = BindingRule::builder("k").condition("x == null").build().unwrap();
        assert!(d.is_callable(&rule, &GenericEvent::new()).unwrap());
    }

    #[test]
    fn test_broken_condition_is_an_error() {
        let d = dispatcher(Container::new(), MissingServicePolicy::Fail);
        let rule = BindingRule::builder("k").condition("x >").build().unwrap();
        let err = d.is_callable(&rule, &GenericEvent::new()).unwrap_err();
        assert_eq!(err.as_label(), "dispatch_condition_failed");
    }

    #[tokio::test]
    async fn test_missing_service_policy() {
        let rule = BindingRule::builder("k")
            .service_call("ghost::run")
            .build()
            .unwrap();

        let strict = dispatcher(Container::new(), MissingServicePolicy::Fail);
        let err = strict.call(&rule, &GenericEvent::new()).await.unwrap_err();
        assert!(matches!(err, DispatchError::ServiceNotFound { service } if service == "ghost"));

        let lenient = dispatcher(Container::new(), MissingServicePolicy::Skip);
        lenient.call(&rule, &GenericEvent::new()).await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_method_and_service_failure() {
        let container = Container::new().with_service("svc", Arc::new(Failing));
        let d = dispatcher(container, MissingServicePolicy::Fail);

        let unknown = BindingRule::builder("k").service_call("svc::nope").build().unwrap();
        let err = d.call(&unknown, &GenericEvent::new()).await.unwrap_err();
        assert_eq!(err.as_label(), "dispatch_unknown_method");

        let failing = BindingRule::builder("k").service_call("svc::run").build().unwrap();
        let err = d.call(&failing, &GenericEvent::new()).await.unwrap_err();
        assert_eq!(err.to_string(), "service call svc::run failed: action failed: down");
    }

    #[tokio::test]
    async fn test_failed_call_aborts_remaining_actions() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let first = Arc::clone(&log);
        let second = Arc::clone(&log);
        let rule = BindingRule::builder("k")
            .call(CallFn::arc("first", move |_ev: &GenericEvent| {
                first.lock().unwrap().push("first");
                Err(ActionError::fail("stop"))
            }))
            .call(CallFn::arc("second", move |_ev: &GenericEvent| {
                second.lock().unwrap().push("second");
                Ok::<_, ActionError>(())
            }))
            .clear_cache("never")
            .build()
            .unwrap();

        let store = Arc::new(InvalidationStore::new());
        let d = Dispatcher {
            cacher: store.clone(),
            ..dispatcher(Container::new(), MissingServicePolicy::Fail)
        };

        let err = d.call(&rule, &GenericEvent::new()).await.unwrap_err();
        assert_eq!(err.as_label(), "dispatch_call_failed");
        assert_eq!(*log.lock().unwrap(), vec!["first"]);
        assert!(store.keys().await.is_empty());
    }
}
