//! Cloud provider trait and desired-state resource set

use crate::action::{ApplyResult, Plan};
use crate::error::{CloudError, Result};
use crate::state::ProviderState;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Cloud provider abstraction trait
///
/// A provider owns the mapping from declared resources to remote API calls:
/// it reads current state, diffs it against the declared set, and applies
/// the resulting plan.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Provider name (e.g., "aws")
    fn name(&self) -> &str;

    /// Display name for operator output
    fn display_name(&self) -> &str;

    /// Check that the provider is configured and authenticated
    async fn check_auth(&self) -> Result<AuthStatus>;

    /// Current state of all resources managed by this provider
    async fn get_state(&self) -> Result<ProviderState>;

    /// Diff the declared set against current state
    async fn plan(&self, desired: &ResourceSet) -> Result<Plan>;

    /// Apply the planned actions, in plan order
    async fn apply(&self, plan: &Plan) -> Result<ApplyResult>;

    /// Destroy a specific resource
    async fn destroy(&self, resource_id: &str) -> Result<()>;

    /// Destroy all resources managed by this provider
    async fn destroy_all(&self) -> Result<ApplyResult>;
}

/// Authentication status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStatus {
    /// Whether authentication is valid
    pub authenticated: bool,

    /// Account/user information if available
    pub account_info: Option<String>,

    /// Error message if not authenticated
    pub error: Option<String>,
}

impl AuthStatus {
    pub fn ok(account_info: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            account_info: Some(account_info.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            account_info: None,
            error: Some(error.into()),
        }
    }
}

/// A single declared resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Resource type (e.g., "bucket", "bucket-sync")
    pub resource_type: String,

    /// Resource identifier
    pub id: String,

    /// Provider name
    pub provider: String,

    /// Keys (`type:id`) of resources that must converge before this one
    pub depends_on: Vec<String>,

    /// Resource-specific configuration
    pub config: serde_json::Value,
}

impl ResourceConfig {
    pub fn new(
        resource_type: impl Into<String>,
        id: impl Into<String>,
        provider: impl Into<String>,
        config: serde_json::Value,
    ) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            provider: provider.into(),
            depends_on: Vec::new(),
            config,
        }
    }

    pub fn depends_on(mut self, key: impl Into<String>) -> Self {
        self.depends_on.push(key.into());
        self
    }

    /// Full resource key, `type:id`
    pub fn key(&self) -> String {
        format!("{}:{}", self.resource_type, self.id)
    }

    /// Get a configuration value as a specific type
    pub fn get_config<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.config
            .get(key)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }
}

/// Declared set of resources for one converge
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceSet {
    /// Resources indexed by `type:id`
    pub resources: BTreeMap<String, ResourceConfig>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, resource: ResourceConfig) {
        self.resources.insert(resource.key(), resource);
    }

    pub fn get(&self, resource_type: &str, id: &str) -> Option<&ResourceConfig> {
        self.resources.get(&format!("{}:{}", resource_type, id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResourceConfig> {
        self.resources.values()
    }

    pub fn by_type(&self, resource_type: &str) -> Vec<&ResourceConfig> {
        self.resources
            .values()
            .filter(|r| r.resource_type == resource_type)
            .collect()
    }

    /// Resources in dependency order: every resource appears after all of
    /// its `depends_on` entries. Ties are broken by key, so the order is
    /// deterministic. Fails on an unknown dependency or a cycle.
    pub fn ordered(&self) -> Result<Vec<&ResourceConfig>> {
        for resource in self.resources.values() {
            for dep in &resource.depends_on {
                if !self.resources.contains_key(dep) {
                    return Err(CloudError::UnknownDependency {
                        resource: resource.key(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        let mut ordered = Vec::with_capacity(self.resources.len());
        let mut placed: BTreeSet<&str> = BTreeSet::new();

        // Kahn's algorithm over the key-sorted map; each pass places every
        // resource whose dependencies are already placed.
        while placed.len() < self.resources.len() {
            let mut progressed = false;
            for (key, resource) in &self.resources {
                if placed.contains(key.as_str()) {
                    continue;
                }
                if resource
                    .depends_on
                    .iter()
                    .all(|dep| placed.contains(dep.as_str()))
                {
                    ordered.push(resource);
                    placed.insert(key.as_str());
                    progressed = true;
                }
            }
            if !progressed {
                let stuck: Vec<_> = self
                    .resources
                    .keys()
                    .filter(|k| !placed.contains(k.as_str()))
                    .cloned()
                    .collect();
                return Err(CloudError::DependencyCycle(stuck.join(", ")));
            }
        }

        Ok(ordered)
    }
}
