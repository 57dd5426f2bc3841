//! siteflow cloud infrastructure
//!
//! Provider abstraction for declarative static-site infrastructure. A site
//! is declared as a small resource graph (bucket, website/access-policy
//! sub-configurations, file sync, CDN distribution); a provider diffs the
//! graph against remote state, applies the resulting plan in dependency
//! order, and records what it converged in `.siteflow/state.json`.

pub mod action;
pub mod desired;
pub mod error;
pub mod provider;
pub mod state;

// Re-exports
pub use action::{Action, ActionResult, ActionType, ApplyResult, Plan, PlanSummary};
pub use desired::{SiteSpec, desired_site, distribution_comment, resource};
pub use error::{CloudError, Result};
pub use provider::{AuthStatus, CloudProvider, ResourceConfig, ResourceSet};
pub use state::{
    GlobalState, ProviderState, ResourceState, ResourceStatus, StateLock, StateManager,
};
