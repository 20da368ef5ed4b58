//! # `service::method` references.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;

const SEPARATOR: &str = "::";

/// A method of a located service, invoked with the triggering event.
///
/// Written as `service::method` in configuration.
///
/// ```rust
/// use hookbind::ServiceCall;
///
/// let call: ServiceCall = "search.indexer::reindex".parse().unwrap();
/// assert_eq!(call.service(), "search.indexer");
/// assert_eq!(call.method(), "reindex");
/// assert_eq!(call.to_string(), "search.indexer::reindex");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServiceCall {
    service: String,
    method: String,
}

impl ServiceCall {
    /// Creates a service call from its parts.
    pub fn new(service: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            method: method.into(),
        }
    }

    /// Name the service is registered under in the locator.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Method name passed to [`Service::call`](crate::Service::call).
    pub fn method(&self) -> &str {
        &self.method
    }
}

impl FromStr for ServiceCall {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ConfigError::MalformedServiceCall {
            value: s.to_string(),
        };

        let (service, method) = s.split_once(SEPARATOR).ok_or_else(malformed)?;
        let (service, method) = (service.trim(), method.trim());
        if service.is_empty() || method.is_empty() || method.contains(SEPARATOR) {
            return Err(malformed());
        }
        Ok(Self::new(service, method))
    }
}

impl fmt::Display for ServiceCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.service, self.method)
    }
}

impl Serialize for ServiceCall {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ServiceCall {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_parts() {
        let call: ServiceCall = " mailer :: send ".parse().unwrap();
        assert_eq!(call, ServiceCall::new("mailer", "send"));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for raw in ["mailer", "::send", "mailer::", "a::b::c", ""] {
            let err = raw.parse::<ServiceCall>().unwrap_err();
            assert_eq!(err.as_label(), "config_malformed_service_call", "input {raw:?}");
        }
    }

    #[test]
    fn test_deserialize_from_notation() {
        let calls: Vec<ServiceCall> =
            serde_json::from_str(r#"["a::b", "cache.warmer::warm"]"#).unwrap();
        assert_eq!(calls[1].service(), "cache.warmer");

        let err = serde_json::from_str::<Vec<ServiceCall>>(r#"["broken"]"#).unwrap_err();
        assert!(err.to_string().contains("malformed service call"));
    }
}
