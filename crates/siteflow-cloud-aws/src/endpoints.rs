//! Computed endpoint and output strings
//!
//! S3 website endpoints only speak HTTP; the distribution always terminates
//! TLS. The four output strings are purely derived from the bucket, the
//! region, and the distribution domain.

/// S3 website endpoint hostname for a bucket.
pub fn website_endpoint(bucket: &str, region: &str) -> String {
    format!("{}.s3-website-{}.amazonaws.com", bucket, region)
}

/// Operator-facing output values for a converged site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteOutputs {
    /// Bucket website endpoint as a URL (always plain HTTP)
    pub origin_url: String,

    /// Bucket website endpoint hostname
    pub origin_hostname: String,

    /// Distribution URL (always HTTPS)
    pub cdn_url: String,

    /// Distribution hostname
    pub cdn_hostname: String,
}

impl SiteOutputs {
    pub fn new(bucket: &str, region: &str, distribution_domain: &str) -> Self {
        let origin_hostname = website_endpoint(bucket, region);
        Self {
            origin_url: format!("http://{}", origin_hostname),
            origin_hostname,
            cdn_url: format!("https://{}", distribution_domain),
            cdn_hostname: distribution_domain.to_string(),
        }
    }
}
