//! Site configuration model
//!
//! A site is a named static website plus per-stage settings. Every stage
//! setting is optional; resolution falls back to fixed defaults so a stage
//! that is never declared still resolves.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default directory synced into the site bucket.
pub const DEFAULT_SOURCE_PATH: &str = "./www";

/// Default index document served at the website root.
pub const DEFAULT_INDEX_DOCUMENT: &str = "index.html";

/// Default document served for missing keys.
pub const DEFAULT_ERROR_DOCUMENT: &str = "error.html";

/// Default AWS region when the site file does not set one.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Parsed site file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site name, used to derive the bucket name
    pub name: String,

    /// Deploy region
    pub region: Option<String>,

    /// Per-stage settings, keyed by stage name
    pub stages: HashMap<String, StageSettings>,
}

impl SiteConfig {
    /// Resolve the settings for a stage.
    ///
    /// An undeclared stage resolves to pure defaults; the loader is a
    /// lookup, not a validator.
    pub fn stage(&self, name: &str) -> StageConfig {
        let settings = self.stages.get(name).cloned().unwrap_or_default();
        StageConfig {
            site: self.name.clone(),
            stage: name.to_string(),
            region: self.region.clone(),
            settings,
        }
    }

    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }
}

/// Raw (possibly unset) settings for a single stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageSettings {
    /// Local directory to sync
    pub path: Option<String>,

    /// Index document name
    pub index_document: Option<String>,

    /// Error document name
    pub error_document: Option<String>,
}

/// A stage resolved against a site
#[derive(Debug, Clone)]
pub struct StageConfig {
    /// Site name
    pub site: String,

    /// Stage name
    pub stage: String,

    region: Option<String>,
    settings: StageSettings,
}

impl StageConfig {
    /// Local directory to sync; set value verbatim or `./www`.
    pub fn source_path(&self) -> &str {
        self.settings.path.as_deref().unwrap_or(DEFAULT_SOURCE_PATH)
    }

    /// Index document; set value verbatim or `index.html`.
    pub fn index_document(&self) -> &str {
        self.settings
            .index_document
            .as_deref()
            .unwrap_or(DEFAULT_INDEX_DOCUMENT)
    }

    /// Error document; set value verbatim or `error.html`.
    pub fn error_document(&self) -> &str {
        self.settings
            .error_document
            .as_deref()
            .unwrap_or(DEFAULT_ERROR_DOCUMENT)
    }

    pub fn region(&self) -> &str {
        self.region.as_deref().unwrap_or(DEFAULT_REGION)
    }

    /// Bucket name for this stage, `{site}-{stage}`.
    pub fn bucket_name(&self) -> String {
        format!("{}-{}", self.site, self.stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteConfig {
        SiteConfig {
            name: "my-site".to_string(),
            region: None,
            stages: HashMap::new(),
        }
    }

    #[test]
    fn test_undeclared_stage_resolves_to_defaults() {
        let stage = site().stage("prod");
        assert_eq!(stage.source_path(), "./www");
        assert_eq!(stage.index_document(), "index.html");
        assert_eq!(stage.error_document(), "error.html");
        assert_eq!(stage.region(), "us-east-1");
    }

    #[test]
    fn test_set_values_returned_verbatim() {
        let mut config = site();
        config.stages.insert(
            "prod".to_string(),
            StageSettings {
                path: Some("dist/site".to_string()),
                index_document: Some("home.html".to_string()),
                error_document: Some("404.html".to_string()),
            },
        );

        let stage = config.stage("prod");
        assert_eq!(stage.source_path(), "dist/site");
        assert_eq!(stage.index_document(), "home.html");
        assert_eq!(stage.error_document(), "404.html");
    }

    #[test]
    fn test_partial_settings_keep_remaining_defaults() {
        let mut config = site();
        config.stages.insert(
            "dev".to_string(),
            StageSettings {
                error_document: Some("oops.html".to_string()),
                ..Default::default()
            },
        );

        let stage = config.stage("dev");
        assert_eq!(stage.source_path(), "./www");
        assert_eq!(stage.index_document(), "index.html");
        assert_eq!(stage.error_document(), "oops.html");
    }

    #[test]
    fn test_bucket_name() {
        let stage = site().stage("prod");
        assert_eq!(stage.bucket_name(), "my-site-prod");
    }
}
