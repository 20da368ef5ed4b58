//! # Configuration snapshot.
//!
//! A [`Configs`] value is one snapshot of every bundle's configuration. The
//! registry rebuilds all bindings from a snapshot on each reload.
//!
//! ## Serialized form
//! ```json
//! {
//!   "bundles": [
//!     {
//!       "name": "cms",
//!       "listeners": [
//!         { "key": "core/object/modify", "subject": "page",
//!           "condition": "published == true",
//!           "clearCaches": ["core/navigation"],
//!           "serviceCalls": ["search.indexer::reindex"] }
//!       ],
//!       "objects": [ { "key": "article", "storageService": "article.storage" } ]
//!     }
//!   ]
//! }
//! ```
//!
//! Call actions are code, not data: attach them with
//! [`BindingRule::builder`](crate::BindingRule::builder) and
//! [`BundleConfig::with_listener`].

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::rules::BindingRule;

/// A storage-backed entity whose caches are cleared when it is modified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDefinition {
    /// Object key; also the subject of its modification events.
    pub key: String,
    /// Name of the storage service in the locator.
    pub storage_service: String,
    /// Human-readable label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ObjectDefinition {
    /// Creates an object definition without label.
    pub fn new(key: impl Into<String>, storage_service: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            storage_service: storage_service.into(),
            label: None,
        }
    }
}

/// Configuration of one bundle.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct BundleConfig {
    /// Bundle name, for logs.
    pub name: String,
    /// Declared listener rules, in declaration order.
    pub listeners: Vec<BindingRule>,
    /// Declared objects, in declaration order.
    pub objects: Vec<ObjectDefinition>,
}

impl BundleConfig {
    /// Creates an empty bundle configuration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends a listener rule.
    pub fn with_listener(mut self, rule: BindingRule) -> Self {
        self.listeners.push(rule);
        self
    }

    /// Appends an object definition.
    pub fn with_object(mut self, object: ObjectDefinition) -> Self {
        self.objects.push(object);
        self
    }

    /// Declared listener rules.
    pub fn listeners(&self) -> &[BindingRule] {
        &self.listeners
    }

    /// Declared objects.
    pub fn objects(&self) -> &[ObjectDefinition] {
        &self.objects
    }
}

/// Ordered snapshot of bundle configurations.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Configs {
    #[serde(default)]
    bundles: Vec<BundleConfig>,
}

impl Configs {
    /// Creates a snapshot from bundles, keeping their order.
    pub fn new(bundles: Vec<BundleConfig>) -> Self {
        Self { bundles }
    }

    /// Decodes a snapshot from its JSON form.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Appends a bundle.
    pub fn with_bundle(mut self, bundle: BundleConfig) -> Self {
        self.bundles.push(bundle);
        self
    }

    /// Bundles in order.
    pub fn bundles(&self) -> &[BundleConfig] {
        &self.bundles
    }

    /// True if there are no bundles.
    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_keeps_order() {
        let configs = Configs::from_json(
            r#"{
                "bundles": [
                    {
                        "name": "cms",
                        "listeners": [
                            {"key": "core/object/modify", "subject": "page",
                             "clearCaches": ["core/navigation"]},
                            {"key": "user/login", "serviceCalls": ["audit::record"]}
                        ],
                        "objects": [
                            {"key": "article", "storageService": "article.storage",
                             "label": "Article"}
                        ]
                    },
                    {"name": "shop"}
                ]
            }"#,
        )
        .unwrap();

        let bundles = configs.bundles();
        assert_eq!(bundles.len(), 2);
        assert_eq!(bundles[0].name, "cms");
        assert_eq!(bundles[0].listeners()[1].key(), "user/login");
        assert_eq!(
            bundles[0].objects()[0],
            ObjectDefinition {
                key: "article".into(),
                storage_service: "article.storage".into(),
                label: Some("Article".into()),
            }
        );
        assert!(bundles[1].listeners().is_empty());
    }

    #[test]
    fn test_from_json_reports_bad_rules() {
        let err = Configs::from_json(
            r#"{"bundles": [{"listeners": [{"key": "k", "serviceCalls": ["nope"]}]}]}"#,
        )
        .unwrap_err();
        assert_eq!(err.as_label(), "config_parse");
        assert!(err.to_string().contains("malformed service call"));
    }

    #[test]
    fn test_object_definition_roundtrip_shape() {
        let raw = serde_json::to_value(ObjectDefinition::new("page", "page.storage")).unwrap();
        assert_eq!(
            raw,
            serde_json::json!({"key": "page", "storageService": "page.storage"})
        );
    }
}
