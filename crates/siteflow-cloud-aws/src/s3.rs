//! S3 bucket operations: container lifecycle, website/access-policy
//! sub-configurations, and the directory sync.

use crate::error::{AwsError, Result};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, ErrorDocument, IndexDocument,
    ObjectCannedAcl, ObjectOwnership, OwnershipControls, OwnershipControlsRule,
    PublicAccessBlockConfiguration, WebsiteConfiguration,
};
use std::path::{Path, PathBuf};

/// S3-side operations for a site bucket
pub struct S3Site {
    client: aws_sdk_s3::Client,
    region: String,
}

impl S3Site {
    pub fn new(client: aws_sdk_s3::Client, region: impl Into<String>) -> Self {
        Self {
            client,
            region: region.into(),
        }
    }

    /// Check whether a bucket exists (and is visible to these credentials).
    pub async fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.as_service_error().is_some_and(|se| se.is_not_found()) {
                    Ok(false)
                } else {
                    Err(AwsError::S3(format!("{}", DisplayErrorContext(e))))
                }
            }
        }
    }

    /// Create the bucket. Regions other than us-east-1 need an explicit
    /// location constraint.
    pub async fn create_bucket(&self, bucket: &str) -> Result<()> {
        let mut request = self.client.create_bucket().bucket(bucket);

        if self.region != "us-east-1" {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        request
            .send()
            .await
            .map_err(|e| AwsError::S3(format!("{}", DisplayErrorContext(e))))?;

        tracing::info!("Created bucket: {}", bucket);
        Ok(())
    }

    /// Apply the website-serving sub-configuration.
    pub async fn put_website_config(
        &self,
        bucket: &str,
        index_document: &str,
        error_document: &str,
    ) -> Result<()> {
        let config = WebsiteConfiguration::builder()
            .index_document(IndexDocument::builder().suffix(index_document).build()?)
            .error_document(ErrorDocument::builder().key(error_document).build()?)
            .build();

        self.client
            .put_bucket_website()
            .bucket(bucket)
            .website_configuration(config)
            .send()
            .await
            .map_err(|e| AwsError::S3(format!("{}", DisplayErrorContext(e))))?;

        tracing::debug!("Applied website configuration to {}", bucket);
        Ok(())
    }

    /// Set object ownership so the uploader owns synced objects.
    pub async fn put_ownership_controls(&self, bucket: &str) -> Result<()> {
        let controls = OwnershipControls::builder()
            .rules(
                OwnershipControlsRule::builder()
                    .object_ownership(ObjectOwnership::ObjectWriter)
                    .build()?,
            )
            .build()?;

        self.client
            .put_bucket_ownership_controls()
            .bucket(bucket)
            .ownership_controls(controls)
            .send()
            .await
            .map_err(|e| AwsError::S3(format!("{}", DisplayErrorContext(e))))?;

        tracing::debug!("Applied ownership controls to {}", bucket);
        Ok(())
    }

    /// Disable the public access block so synced objects can carry a
    /// public-read ACL.
    pub async fn put_public_access_block(&self, bucket: &str) -> Result<()> {
        let config = PublicAccessBlockConfiguration::builder()
            .block_public_acls(false)
            .block_public_policy(false)
            .ignore_public_acls(false)
            .restrict_public_buckets(false)
            .build();

        self.client
            .put_public_access_block()
            .bucket(bucket)
            .public_access_block_configuration(config)
            .send()
            .await
            .map_err(|e| AwsError::S3(format!("{}", DisplayErrorContext(e))))?;

        tracing::debug!("Disabled public access block on {}", bucket);
        Ok(())
    }

    /// One-way sync of a local directory into the bucket. Every file is
    /// re-uploaded with a public-read ACL; remote diffing is not attempted.
    /// Returns the number of uploaded objects.
    pub async fn sync_dir(&self, bucket: &str, source_path: &str) -> Result<usize> {
        let root = Path::new(source_path);
        if !root.is_dir() {
            return Err(AwsError::SourceDirNotFound(source_path.to_string()));
        }

        let files = collect_files(root)?;
        tracing::info!(
            "Syncing {} files from {} into {}",
            files.len(),
            source_path,
            bucket
        );

        for (path, key) in &files {
            let body = tokio::fs::read(path).await?;
            self.client
                .put_object()
                .bucket(bucket)
                .key(key)
                .body(ByteStream::from(body))
                .acl(ObjectCannedAcl::PublicRead)
                .content_type(content_type_for(path))
                .send()
                .await
                .map_err(|e| AwsError::S3(format!("{}", DisplayErrorContext(e))))?;

            tracing::debug!("Uploaded {} -> s3://{}/{}", path.display(), bucket, key);
        }

        Ok(files.len())
    }

    /// Delete every object in the bucket, then the bucket itself.
    pub async fn empty_and_delete_bucket(&self, bucket: &str) -> Result<()> {
        let mut continuation_token = None;
        loop {
            let mut request = self.client.list_objects_v2().bucket(bucket);
            if let Some(token) = continuation_token.take() {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| AwsError::S3(format!("{}", DisplayErrorContext(e))))?;

            for object in response.contents() {
                if let Some(key) = object.key() {
                    self.client
                        .delete_object()
                        .bucket(bucket)
                        .key(key)
                        .send()
                        .await
                        .map_err(|e| AwsError::S3(format!("{}", DisplayErrorContext(e))))?;
                }
            }

            if response.is_truncated() == Some(true) {
                continuation_token = response.next_continuation_token().map(ToOwned::to_owned);
            } else {
                break;
            }
        }

        self.client
            .delete_bucket()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| AwsError::S3(format!("{}", DisplayErrorContext(e))))?;

        tracing::info!("Deleted bucket: {}", bucket);
        Ok(())
    }
}

/// Recursively collect files under `root` as (path, object key) pairs.
/// Keys are relative to `root` with `/` separators, sorted for stable
/// upload order.
fn collect_files(root: &Path) -> Result<Vec<(PathBuf, String)>> {
    let mut files = Vec::new();
    collect_into(root, root, &mut files)?;
    files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(files)
}

fn collect_into(root: &Path, dir: &Path, out: &mut Vec<(PathBuf, String)>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_into(root, &path, out)?;
        } else {
            let key = path
                .strip_prefix(root)
                .unwrap_or(&path)
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            out.push((path, key));
        }
    }
    Ok(())
}

/// Content type from the file extension. Unknown extensions fall back to
/// octet-stream.
fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("txt") => "text/plain",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("pdf") => "application/pdf",
        Some("wasm") => "application/wasm",
        _ => "application/octet-stream",
    }
}
