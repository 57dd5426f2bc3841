//! CloudFront distribution operations
//!
//! The distribution fronts the bucket website endpoint over plain HTTP
//! (the endpoint has no native HTTPS) and terminates TLS with the shared
//! CloudFront certificate. Cache policy is fixed: read-only methods, a
//! 600 second TTL with no variation, and a 404 rewrite to the error
//! document. Distributions have no name key, so ours are recognized by
//! their comment marker.

use crate::error::{AwsError, Result};
use aws_sdk_cloudfront::error::DisplayErrorContext;
use aws_sdk_cloudfront::types::{
    AllowedMethods, CachedMethods, CookiePreference, CustomErrorResponse, CustomErrorResponses,
    CustomOriginConfig, DefaultCacheBehavior, DistributionConfig, ForwardedValues, GeoRestriction,
    GeoRestrictionType, ItemSelection, Method, Origin, OriginProtocolPolicy, OriginSslProtocols,
    Origins, PriceClass, Restrictions, SslProtocol, ViewerCertificate, ViewerProtocolPolicy,
};
use std::time::Duration;

/// Fixed cache lifetime: minimum = default = maximum.
const CACHE_TTL_SECONDS: i64 = 600;

/// How long to poll for a distribution to reach Deployed before giving up.
const DEPLOY_POLL_INTERVAL: Duration = Duration::from_secs(15);
const DEPLOY_POLL_ATTEMPTS: u32 = 40;

/// CloudFront-side operations for a site distribution
pub struct Cdn {
    client: aws_sdk_cloudfront::Client,
}

/// Minimal distribution info surfaced to the provider
#[derive(Debug, Clone)]
pub struct DistributionInfo {
    pub id: String,
    pub domain_name: String,
    pub status: String,
}

impl DistributionInfo {
    pub fn is_deployed(&self) -> bool {
        self.status == "Deployed"
    }
}

impl Cdn {
    pub fn new(client: aws_sdk_cloudfront::Client) -> Self {
        Self { client }
    }

    /// Find a distribution by its comment marker, paging through the full
    /// list.
    pub async fn find_distribution(&self, comment: &str) -> Result<Option<DistributionInfo>> {
        let mut marker: Option<String> = None;

        loop {
            let mut request = self.client.list_distributions();
            if let Some(m) = marker.take() {
                request = request.marker(m);
            }

            let response = request
                .send()
                .await
                .map_err(|e| AwsError::CloudFront(format!("{}", DisplayErrorContext(e))))?;

            let Some(list) = response.distribution_list() else {
                return Ok(None);
            };

            for summary in list.items() {
                if summary.comment() == comment {
                    return Ok(Some(DistributionInfo {
                        id: summary.id().to_string(),
                        domain_name: summary.domain_name().to_string(),
                        status: summary.status().to_string(),
                    }));
                }
            }

            if list.is_truncated() {
                marker = list.next_marker().map(ToOwned::to_owned);
            } else {
                return Ok(None);
            }
        }
    }

    /// Create a distribution fronting the given origin domain.
    pub async fn create_distribution(
        &self,
        site: &str,
        origin_domain: &str,
        error_response_path: &str,
        comment: &str,
    ) -> Result<DistributionInfo> {
        let caller_reference = format!(
            "siteflow-{}-{}",
            site,
            chrono::Utc::now().timestamp_millis()
        );
        let config = build_distribution_config(
            &caller_reference,
            origin_domain,
            error_response_path,
            comment,
        )?;

        let response = self
            .client
            .create_distribution()
            .distribution_config(config)
            .send()
            .await
            .map_err(|e| AwsError::CloudFront(format!("{}", DisplayErrorContext(e))))?;

        let distribution = response
            .distribution()
            .ok_or_else(|| AwsError::CloudFront("no distribution in response".to_string()))?;

        tracing::info!(
            "Created distribution {} ({})",
            distribution.id(),
            distribution.domain_name()
        );

        Ok(DistributionInfo {
            id: distribution.id().to_string(),
            domain_name: distribution.domain_name().to_string(),
            status: distribution.status().to_string(),
        })
    }

    /// Push the declared configuration onto an existing distribution.
    /// The caller reference is immutable, so it is carried over from the
    /// live configuration.
    pub async fn update_distribution(
        &self,
        id: &str,
        origin_domain: &str,
        error_response_path: &str,
        comment: &str,
    ) -> Result<()> {
        let current = self
            .client
            .get_distribution_config()
            .id(id)
            .send()
            .await
            .map_err(|e| AwsError::CloudFront(format!("{}", DisplayErrorContext(e))))?;

        let etag = current
            .e_tag()
            .ok_or_else(|| AwsError::CloudFront(format!("no etag for distribution {}", id)))?
            .to_string();
        let caller_reference = current
            .distribution_config()
            .map(|c| c.caller_reference().to_string())
            .ok_or_else(|| AwsError::CloudFront(format!("no config for distribution {}", id)))?;

        let config = build_distribution_config(
            &caller_reference,
            origin_domain,
            error_response_path,
            comment,
        )?;

        self.client
            .update_distribution()
            .id(id)
            .if_match(etag)
            .distribution_config(config)
            .send()
            .await
            .map_err(|e| AwsError::CloudFront(format!("{}", DisplayErrorContext(e))))?;

        tracing::info!("Updated distribution {}", id);
        Ok(())
    }

    /// Disable the distribution, wait for it to finish deploying, then
    /// delete it. CloudFront refuses to delete an enabled or in-progress
    /// distribution.
    pub async fn disable_and_delete(&self, id: &str) -> Result<()> {
        let current = self
            .client
            .get_distribution_config()
            .id(id)
            .send()
            .await
            .map_err(|e| AwsError::CloudFront(format!("{}", DisplayErrorContext(e))))?;

        let etag = current
            .e_tag()
            .ok_or_else(|| AwsError::CloudFront(format!("no etag for distribution {}", id)))?
            .to_string();
        let config = current
            .distribution_config()
            .cloned()
            .ok_or_else(|| AwsError::CloudFront(format!("no config for distribution {}", id)))?;

        if config.enabled() {
            tracing::info!("Disabling distribution {}", id);
            let mut disabled = config;
            disabled.enabled = false;

            self.client
                .update_distribution()
                .id(id)
                .if_match(etag)
                .distribution_config(disabled)
                .send()
                .await
                .map_err(|e| AwsError::CloudFront(format!("{}", DisplayErrorContext(e))))?;
        }

        self.wait_until_deployed(id).await?;

        // Re-read for the post-disable etag
        let current = self
            .client
            .get_distribution_config()
            .id(id)
            .send()
            .await
            .map_err(|e| AwsError::CloudFront(format!("{}", DisplayErrorContext(e))))?;
        let etag = current
            .e_tag()
            .ok_or_else(|| AwsError::CloudFront(format!("no etag for distribution {}", id)))?
            .to_string();

        self.client
            .delete_distribution()
            .id(id)
            .if_match(etag)
            .send()
            .await
            .map_err(|e| AwsError::CloudFront(format!("{}", DisplayErrorContext(e))))?;

        tracing::info!("Deleted distribution {}", id);
        Ok(())
    }

    async fn wait_until_deployed(&self, id: &str) -> Result<()> {
        for attempt in 0..DEPLOY_POLL_ATTEMPTS {
            let response = self
                .client
                .get_distribution()
                .id(id)
                .send()
                .await
                .map_err(|e| AwsError::CloudFront(format!("{}", DisplayErrorContext(e))))?;

            if let Some(distribution) = response.distribution() {
                if distribution.status() == "Deployed" {
                    return Ok(());
                }
                tracing::debug!(
                    "Distribution {} is {} (attempt {}/{})",
                    id,
                    distribution.status(),
                    attempt + 1,
                    DEPLOY_POLL_ATTEMPTS
                );
            }

            tokio::time::sleep(DEPLOY_POLL_INTERVAL).await;
        }

        Err(AwsError::DeployTimeout(id.to_string()))
    }
}

/// Declared distribution configuration.
///
/// - single custom origin at the bucket website endpoint, HTTP only,
///   TLSv1.2 floor for origin SSL
/// - viewers redirected to HTTPS; GET/HEAD/OPTIONS allowed, GET/HEAD cached
/// - query strings and all cookies forwarded unchanged
/// - min = default = max TTL of 600 seconds
/// - origin 404s rewritten to the error document, still served as 404
/// - cheapest edge tier, no geo restriction, shared default certificate
// Legacy cache settings (forwarded values, per-behavior TTLs) carry the
// fixed forward-all/600s policy; cache policies are their replacement.
#[allow(deprecated)]
pub fn build_distribution_config(
    caller_reference: &str,
    origin_domain: &str,
    error_response_path: &str,
    comment: &str,
) -> Result<DistributionConfig> {
    let origin_id = origin_domain.to_string();

    let origin = Origin::builder()
        .id(&origin_id)
        .domain_name(origin_domain)
        .custom_origin_config(
            CustomOriginConfig::builder()
                .http_port(80)
                .https_port(443)
                .origin_protocol_policy(OriginProtocolPolicy::HttpOnly)
                .origin_ssl_protocols(
                    OriginSslProtocols::builder()
                        .quantity(1)
                        .items(SslProtocol::TlSv12)
                        .build()?,
                )
                .build()?,
        )
        .build()?;

    let default_cache_behavior = DefaultCacheBehavior::builder()
        .target_origin_id(&origin_id)
        .viewer_protocol_policy(ViewerProtocolPolicy::RedirectToHttps)
        .allowed_methods(
            AllowedMethods::builder()
                .quantity(3)
                .items(Method::Get)
                .items(Method::Head)
                .items(Method::Options)
                .cached_methods(
                    CachedMethods::builder()
                        .quantity(2)
                        .items(Method::Get)
                        .items(Method::Head)
                        .build()?,
                )
                .build()?,
        )
        .forwarded_values(
            ForwardedValues::builder()
                .query_string(true)
                .cookies(
                    CookiePreference::builder()
                        .forward(ItemSelection::All)
                        .build()?,
                )
                .build()?,
        )
        .min_ttl(CACHE_TTL_SECONDS)
        .default_ttl(CACHE_TTL_SECONDS)
        .max_ttl(CACHE_TTL_SECONDS)
        .build()?;

    let config = DistributionConfig::builder()
        .caller_reference(caller_reference)
        .comment(comment)
        .enabled(true)
        .origins(Origins::builder().quantity(1).items(origin).build()?)
        .default_cache_behavior(default_cache_behavior)
        .custom_error_responses(
            CustomErrorResponses::builder()
                .quantity(1)
                .items(
                    CustomErrorResponse::builder()
                        .error_code(404)
                        .response_page_path(error_response_path)
                        .response_code("404")
                        .error_caching_min_ttl(CACHE_TTL_SECONDS)
                        .build()?,
                )
                .build()?,
        )
        .price_class(PriceClass::PriceClass100)
        .restrictions(
            Restrictions::builder()
                .geo_restriction(
                    GeoRestriction::builder()
                        .restriction_type(GeoRestrictionType::None)
                        .quantity(0)
                        .build()?,
                )
                .build(),
        )
        .viewer_certificate(
            ViewerCertificate::builder()
                .cloud_front_default_certificate(true)
                .build(),
        )
        .build()?;

    Ok(config)
}

#[cfg(test)]
#[allow(deprecated)] // legacy cache-config accessors
mod tests {
    use super::*;

    fn config() -> DistributionConfig {
        build_distribution_config(
            "siteflow-test-1",
            "my-site-prod.s3-website-us-east-1.amazonaws.com",
            "/error.html",
            "siteflow:my-site",
        )
        .unwrap()
    }

    #[test]
    fn test_single_origin_at_website_endpoint() {
        let config = config();
        let origins = config.origins().unwrap();
        assert_eq!(origins.quantity(), 1);

        let origin = &origins.items()[0];
        assert_eq!(
            origin.domain_name(),
            "my-site-prod.s3-website-us-east-1.amazonaws.com"
        );

        let custom = origin.custom_origin_config().unwrap();
        assert_eq!(
            custom.origin_protocol_policy(),
            &OriginProtocolPolicy::HttpOnly
        );
    }

    #[test]
    fn test_cache_behavior_is_fixed() {
        let config = config();
        let behavior = config.default_cache_behavior().unwrap();

        assert_eq!(
            behavior.viewer_protocol_policy(),
            &ViewerProtocolPolicy::RedirectToHttps
        );
        assert_eq!(behavior.min_ttl(), Some(600));
        assert_eq!(behavior.default_ttl(), Some(600));
        assert_eq!(behavior.max_ttl(), Some(600));

        let methods = behavior.allowed_methods().unwrap();
        assert_eq!(methods.quantity(), 3);
        assert!(methods.items().contains(&Method::Get));
        assert!(methods.items().contains(&Method::Head));
        assert!(methods.items().contains(&Method::Options));
        assert_eq!(methods.cached_methods().unwrap().quantity(), 2);

        let forwarded = behavior.forwarded_values().unwrap();
        assert!(forwarded.query_string());
        assert_eq!(forwarded.cookies().unwrap().forward(), &ItemSelection::All);
    }

    #[test]
    fn test_custom_error_response_maps_404() {
        let config = config();
        let responses = config.custom_error_responses().unwrap();
        assert_eq!(responses.quantity(), 1);

        let response = &responses.items()[0];
        assert_eq!(response.error_code(), 404);
        assert_eq!(response.response_page_path(), Some("/error.html"));
        assert_eq!(response.response_code(), Some("404"));
    }

    #[test]
    fn test_default_certificate_and_no_geo_restriction() {
        let config = config();

        let certificate = config.viewer_certificate().unwrap();
        assert_eq!(certificate.cloud_front_default_certificate(), Some(true));

        let restriction = config.restrictions().unwrap().geo_restriction().unwrap();
        assert_eq!(restriction.restriction_type(), &GeoRestrictionType::None);
        assert_eq!(restriction.quantity(), 0);

        assert_eq!(config.price_class(), Some(&PriceClass::PriceClass100));
    }

    #[test]
    fn test_distribution_is_enabled_with_comment() {
        let config = config();
        assert!(config.enabled());
        assert_eq!(config.comment(), "siteflow:my-site");
        assert_eq!(config.caller_reference(), "siteflow-test-1");
    }
}
