//! AWS provider for siteflow
//!
//! Maps the declared site graph onto S3 and CloudFront:
//!
//! - the bucket and its website/ownership/public-access sub-configurations
//! - the one-way directory sync with public-read objects
//! - the distribution fronting the bucket website endpoint
//!
//! All planning and ordering is driven by the declared set; the provider
//! surfaces AWS errors verbatim and never retries.

pub mod cloudfront;
pub mod endpoints;
pub mod error;
pub mod provider;
pub mod s3;

pub use cloudfront::{Cdn, DistributionInfo, build_distribution_config};
pub use endpoints::{SiteOutputs, website_endpoint};
pub use error::{AwsError, Result};
pub use provider::AwsProvider;
pub use s3::S3Site;
