//! Desired-state declaration graph for a static site
//!
//! One converge declares six resources: the bucket, its website and
//! access-policy sub-configurations, the file sync, and the CDN
//! distribution. The only ordering the declarations must express
//! themselves is that the sync runs after both access-policy resources,
//! so uploaded objects get their public ACL applied correctly; everything
//! else follows from the bucket edges.

use crate::provider::{ResourceConfig, ResourceSet};
use serde_json::json;

/// Resource type names used by the declaration graph
pub mod resource {
    /// Object storage bucket
    pub const BUCKET: &str = "bucket";
    /// Website-serving sub-configuration (index/error documents)
    pub const BUCKET_WEBSITE: &str = "bucket-website";
    /// Object ownership sub-configuration
    pub const BUCKET_OWNERSHIP: &str = "bucket-ownership";
    /// Public access block sub-configuration
    pub const BUCKET_ACCESS: &str = "bucket-access";
    /// One-way sync of the local source directory
    pub const BUCKET_SYNC: &str = "bucket-sync";
    /// CDN distribution in front of the bucket website endpoint
    pub const DISTRIBUTION: &str = "distribution";
}

/// Everything needed to declare one site's resources
#[derive(Debug, Clone)]
pub struct SiteSpec {
    /// Site identifier (resource id for every declaration)
    pub site: String,

    /// Bucket name
    pub bucket: String,

    /// Provider name
    pub provider: String,

    /// Local directory to sync into the bucket
    pub source_path: String,

    /// Index document name
    pub index_document: String,

    /// Error document name
    pub error_document: String,
}

/// Build the declaration graph for a site.
pub fn desired_site(spec: &SiteSpec) -> ResourceSet {
    let mut set = ResourceSet::new();

    let bucket_key = format!("{}:{}", resource::BUCKET, spec.site);
    let ownership_key = format!("{}:{}", resource::BUCKET_OWNERSHIP, spec.site);
    let access_key = format!("{}:{}", resource::BUCKET_ACCESS, spec.site);
    let website_key = format!("{}:{}", resource::BUCKET_WEBSITE, spec.site);

    set.add(ResourceConfig::new(
        resource::BUCKET,
        &spec.site,
        &spec.provider,
        json!({ "bucket": spec.bucket }),
    ));

    set.add(
        ResourceConfig::new(
            resource::BUCKET_WEBSITE,
            &spec.site,
            &spec.provider,
            json!({
                "bucket": spec.bucket,
                "index_document": spec.index_document,
                "error_document": spec.error_document,
            }),
        )
        .depends_on(&bucket_key),
    );

    set.add(
        ResourceConfig::new(
            resource::BUCKET_OWNERSHIP,
            &spec.site,
            &spec.provider,
            json!({
                "bucket": spec.bucket,
                "object_ownership": "ObjectWriter",
            }),
        )
        .depends_on(&bucket_key),
    );

    set.add(
        ResourceConfig::new(
            resource::BUCKET_ACCESS,
            &spec.site,
            &spec.provider,
            json!({
                "bucket": spec.bucket,
                "block_public_acls": false,
                "block_public_policy": false,
                "ignore_public_acls": false,
                "restrict_public_buckets": false,
            }),
        )
        .depends_on(&bucket_key),
    );

    // Permissions must be final before any object is uploaded.
    set.add(
        ResourceConfig::new(
            resource::BUCKET_SYNC,
            &spec.site,
            &spec.provider,
            json!({
                "bucket": spec.bucket,
                "source_path": spec.source_path,
                "acl": "public-read",
            }),
        )
        .depends_on(&ownership_key)
        .depends_on(&access_key),
    );

    set.add(
        ResourceConfig::new(
            resource::DISTRIBUTION,
            &spec.site,
            &spec.provider,
            json!({
                "bucket": spec.bucket,
                "error_document": spec.error_document,
                "error_response_path": format!("/{}", spec.error_document),
                "comment": distribution_comment(&spec.site),
            }),
        )
        .depends_on(&website_key),
    );

    set
}

/// Marker comment used to recognize a site's distribution across converges.
pub fn distribution_comment(site: &str) -> String {
    format!("siteflow:{}", site)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> SiteSpec {
        SiteSpec {
            site: "my-site".to_string(),
            bucket: "my-site-prod".to_string(),
            provider: "aws".to_string(),
            source_path: "./www".to_string(),
            index_document: "index.html".to_string(),
            error_document: "error.html".to_string(),
        }
    }

    #[test]
    fn test_declares_six_resources() {
        let set = desired_site(&spec());
        assert_eq!(set.resources.len(), 6);
        for r in set.iter() {
            assert_eq!(r.id, "my-site");
            assert_eq!(r.provider, "aws");
        }
    }

    #[test]
    fn test_sync_always_depends_on_both_access_policies() {
        // The prerequisites hold regardless of configuration values.
        for error_document in ["error.html", "404.html", "oops/not-found.html"] {
            let mut s = spec();
            s.error_document = error_document.to_string();
            s.source_path = "./somewhere-else".to_string();

            let set = desired_site(&s);
            let sync = set.get(resource::BUCKET_SYNC, "my-site").unwrap();
            assert!(sync.depends_on.contains(&"bucket-ownership:my-site".to_string()));
            assert!(sync.depends_on.contains(&"bucket-access:my-site".to_string()));
        }
    }

    #[test]
    fn test_error_response_path_is_slash_plus_error_document() {
        let mut s = spec();
        s.error_document = "404.html".to_string();

        let set = desired_site(&s);
        let dist = set.get(resource::DISTRIBUTION, "my-site").unwrap();
        assert_eq!(
            dist.get_config::<String>("error_response_path").as_deref(),
            Some("/404.html")
        );
    }

    #[test]
    fn test_graph_orders_bucket_before_sync_and_distribution() {
        let set = desired_site(&spec());
        let keys: Vec<String> = set.ordered().unwrap().iter().map(|r| r.key()).collect();

        let pos = |key: &str| keys.iter().position(|k| k == key).unwrap();
        assert!(pos("bucket:my-site") < pos("bucket-ownership:my-site"));
        assert!(pos("bucket:my-site") < pos("bucket-access:my-site"));
        assert!(pos("bucket-ownership:my-site") < pos("bucket-sync:my-site"));
        assert!(pos("bucket-access:my-site") < pos("bucket-sync:my-site"));
        assert!(pos("bucket-website:my-site") < pos("distribution:my-site"));
    }

    #[test]
    fn test_access_block_fully_disabled() {
        let set = desired_site(&spec());
        let access = set.get(resource::BUCKET_ACCESS, "my-site").unwrap();
        for flag in [
            "block_public_acls",
            "block_public_policy",
            "ignore_public_acls",
            "restrict_public_buckets",
        ] {
            assert_eq!(access.get_config::<bool>(flag), Some(false));
        }
    }

    #[test]
    fn test_distribution_comment() {
        assert_eq!(distribution_comment("my-site"), "siteflow:my-site");
    }
}
