//! AWS provider error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AwsError {
    #[error("AWS authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("S3 error: {0}")]
    S3(String),

    #[error("CloudFront error: {0}")]
    CloudFront(String),

    #[error("Bucket not found: {0}")]
    BucketNotFound(String),

    #[error("Distribution not found for site: {0}")]
    DistributionNotFound(String),

    #[error("Source directory not found: {0}")]
    SourceDirNotFound(String),

    #[error("Timed out waiting for distribution {0} to deploy")]
    DeployTimeout(String),

    #[error("Invalid request: {0}")]
    Build(#[from] aws_sdk_s3::error::BuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cloud error: {0}")]
    Cloud(#[from] siteflow_cloud::CloudError),
}

impl From<AwsError> for siteflow_cloud::CloudError {
    fn from(err: AwsError) -> Self {
        match err {
            AwsError::Cloud(e) => e,
            AwsError::AuthenticationFailed(msg) => {
                siteflow_cloud::CloudError::AuthenticationFailed(msg)
            }
            other => siteflow_cloud::CloudError::ApiError(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AwsError>;
