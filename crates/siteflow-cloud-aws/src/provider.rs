//! AWS provider implementation

use crate::cloudfront::Cdn;
use crate::endpoints::{SiteOutputs, website_endpoint};
use crate::error::Result;
use crate::s3::S3Site;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sts::error::DisplayErrorContext;
use serde_json::json;
use siteflow_cloud::{
    Action, ActionType, ApplyResult, AuthStatus, CloudProvider, Plan, ProviderState,
    ResourceConfig, ResourceSet, ResourceState, ResourceStatus, distribution_comment, resource,
};

/// AWS provider for a single site
///
/// The provider is scoped to one site: it knows the bucket name and finds
/// the site's distribution through its comment marker, so `get_state` needs
/// no inputs beyond the declared set.
pub struct AwsProvider {
    s3: S3Site,
    cdn: Cdn,
    sts: aws_sdk_sts::Client,
    region: String,
    site: String,
    bucket: String,
}

impl AwsProvider {
    /// Load shared AWS configuration and build the service clients.
    pub async fn connect(
        region: impl Into<String>,
        site: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        let region = region.into();
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .load()
            .await;

        Self {
            s3: S3Site::new(aws_sdk_s3::Client::new(&sdk_config), region.clone()),
            cdn: Cdn::new(aws_sdk_cloudfront::Client::new(&sdk_config)),
            sts: aws_sdk_sts::Client::new(&sdk_config),
            region,
            site: site.into(),
            bucket: bucket.into(),
        }
    }

    /// Output values for the converged site, if the distribution exists.
    pub async fn outputs(&self) -> Result<Option<SiteOutputs>> {
        let distribution = self
            .cdn
            .find_distribution(&distribution_comment(&self.site))
            .await?;

        Ok(distribution
            .map(|info| SiteOutputs::new(&self.bucket, &self.region, &info.domain_name)))
    }

    fn bucket_key(&self) -> String {
        format!("{}:{}", resource::BUCKET, self.site)
    }

    fn distribution_key(&self) -> String {
        format!("{}:{}", resource::DISTRIBUTION, self.site)
    }
}

/// Pull a string field out of the declared config carried on an action.
fn config_str<'a>(action: &'a Action, field: &str) -> Option<&'a str> {
    action
        .details
        .get("config")
        .and_then(|c| c.get(field))
        .and_then(|v| v.as_str())
}

fn plan_action(
    action_type: ActionType,
    resource: &ResourceConfig,
    description: impl Into<String>,
) -> Action {
    Action::new(action_type, &resource.resource_type, &resource.id, description)
        .with_detail("config", resource.config.clone())
}

#[async_trait]
impl CloudProvider for AwsProvider {
    fn name(&self) -> &str {
        "aws"
    }

    fn display_name(&self) -> &str {
        "AWS"
    }

    async fn check_auth(&self) -> siteflow_cloud::Result<AuthStatus> {
        match self.sts.get_caller_identity().send().await {
            Ok(identity) => {
                let account = identity.account().unwrap_or("unknown account");
                let arn = identity.arn().unwrap_or("unknown arn");
                Ok(AuthStatus::ok(format!("{} ({})", account, arn)))
            }
            Err(e) => Ok(AuthStatus::failed(format!("{}", DisplayErrorContext(e)))),
        }
    }

    async fn get_state(&self) -> siteflow_cloud::Result<ProviderState> {
        let mut state = ProviderState::new();

        if self.s3.bucket_exists(&self.bucket).await? {
            state.add(
                self.bucket_key(),
                ResourceState::new(&self.bucket, resource::BUCKET)
                    .with_status(ResourceStatus::Active)
                    .with_attribute(
                        "website_endpoint",
                        json!(website_endpoint(&self.bucket, &self.region)),
                    ),
            );
        }

        if let Some(info) = self
            .cdn
            .find_distribution(&distribution_comment(&self.site))
            .await?
        {
            let status = if info.is_deployed() {
                ResourceStatus::Active
            } else {
                ResourceStatus::Creating
            };
            state.add(
                self.distribution_key(),
                ResourceState::new(&info.id, resource::DISTRIBUTION)
                    .with_status(status)
                    .with_attribute("domain_name", json!(info.domain_name)),
            );
        }

        Ok(state)
    }

    async fn plan(&self, desired: &ResourceSet) -> siteflow_cloud::Result<Plan> {
        let current = self.get_state().await?;
        let bucket_exists = current.get(&self.bucket_key()).is_some();
        let distribution = current.get(&self.distribution_key());

        let mut actions = Vec::new();

        // The declared set is already a DAG; planning walks it in
        // dependency order so the apply loop can run actions as-is.
        for declared in desired.ordered()? {
            let bucket = declared
                .get_config::<String>("bucket")
                .unwrap_or_else(|| self.bucket.clone());

            let action = match declared.resource_type.as_str() {
                resource::BUCKET => {
                    if bucket_exists {
                        plan_action(
                            ActionType::NoOp,
                            declared,
                            format!("bucket {} already exists", bucket),
                        )
                    } else {
                        plan_action(
                            ActionType::Create,
                            declared,
                            format!("create bucket {}", bucket),
                        )
                    }
                }
                resource::BUCKET_WEBSITE => plan_action(
                    ActionType::Update,
                    declared,
                    format!("apply website configuration to {}", bucket),
                ),
                resource::BUCKET_OWNERSHIP => plan_action(
                    ActionType::Update,
                    declared,
                    format!("apply ownership controls to {}", bucket),
                ),
                resource::BUCKET_ACCESS => plan_action(
                    ActionType::Update,
                    declared,
                    format!("disable public access block on {}", bucket),
                ),
                resource::BUCKET_SYNC => {
                    let source = declared
                        .get_config::<String>("source_path")
                        .unwrap_or_default();
                    plan_action(
                        ActionType::Update,
                        declared,
                        format!("sync {} into bucket {}", source, bucket),
                    )
                }
                resource::DISTRIBUTION => match distribution {
                    Some(existing) => plan_action(
                        ActionType::Update,
                        declared,
                        format!("update distribution {}", existing.id),
                    )
                    .with_detail("distribution_id", json!(existing.id)),
                    None => plan_action(
                        ActionType::Create,
                        declared,
                        format!("create distribution for {}", bucket),
                    ),
                },
                other => plan_action(
                    ActionType::NoOp,
                    declared,
                    format!("unsupported resource type: {}", other),
                ),
            };

            actions.push(action);
        }

        Ok(Plan::new(actions))
    }

    async fn apply(&self, plan: &Plan) -> siteflow_cloud::Result<ApplyResult> {
        let mut result = ApplyResult::new();
        let start = std::time::Instant::now();

        for action in &plan.actions {
            if action.action_type == ActionType::NoOp {
                continue;
            }

            let bucket = config_str(action, "bucket").unwrap_or(&self.bucket).to_string();

            let outcome: Result<String> = match action.resource_type.as_str() {
                resource::BUCKET => {
                    tracing::info!("Creating bucket: {}", bucket);
                    self.s3
                        .create_bucket(&bucket)
                        .await
                        .map(|_| format!("created bucket {}", bucket))
                }
                resource::BUCKET_WEBSITE => {
                    let index = config_str(action, "index_document").unwrap_or("index.html");
                    let error = config_str(action, "error_document").unwrap_or("error.html");
                    self.s3
                        .put_website_config(&bucket, index, error)
                        .await
                        .map(|_| format!("website configuration applied to {}", bucket))
                }
                resource::BUCKET_OWNERSHIP => self
                    .s3
                    .put_ownership_controls(&bucket)
                    .await
                    .map(|_| format!("ownership controls applied to {}", bucket)),
                resource::BUCKET_ACCESS => self
                    .s3
                    .put_public_access_block(&bucket)
                    .await
                    .map(|_| format!("public access block disabled on {}", bucket)),
                resource::BUCKET_SYNC => {
                    let source = config_str(action, "source_path").unwrap_or(".");
                    self.s3
                        .sync_dir(&bucket, source)
                        .await
                        .map(|count| format!("uploaded {} objects to {}", count, bucket))
                }
                resource::DISTRIBUTION => {
                    let origin = website_endpoint(&bucket, &self.region);
                    let error_path = config_str(action, "error_response_path")
                        .unwrap_or("/error.html")
                        .to_string();
                    let comment = config_str(action, "comment")
                        .map(ToOwned::to_owned)
                        .unwrap_or_else(|| distribution_comment(&self.site));

                    match action.action_type {
                        ActionType::Create => self
                            .cdn
                            .create_distribution(&self.site, &origin, &error_path, &comment)
                            .await
                            .map(|info| {
                                format!("created distribution {} ({})", info.id, info.domain_name)
                            }),
                        _ => {
                            let id = action
                                .details
                                .get("distribution_id")
                                .and_then(|v| v.as_str())
                                .unwrap_or_default()
                                .to_string();
                            self.cdn
                                .update_distribution(&id, &origin, &error_path, &comment)
                                .await
                                .map(|_| format!("updated distribution {}", id))
                        }
                    }
                }
                other => Err(crate::error::AwsError::CloudFront(format!(
                    "unsupported resource type: {}",
                    other
                ))),
            };

            match outcome {
                Ok(message) => result.add_success(action.id.clone(), message),
                Err(e) => {
                    // Later actions depend on earlier ones; stop here and
                    // surface the provider error verbatim.
                    result.add_failure(action.id.clone(), e.to_string());
                    break;
                }
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }

    async fn destroy(&self, resource_id: &str) -> siteflow_cloud::Result<()> {
        if resource_id == self.bucket {
            self.s3.empty_and_delete_bucket(resource_id).await?;
        } else {
            self.cdn.disable_and_delete(resource_id).await?;
        }
        Ok(())
    }

    async fn destroy_all(&self) -> siteflow_cloud::Result<ApplyResult> {
        let mut result = ApplyResult::new();
        let start = std::time::Instant::now();

        // The distribution goes first: it references the bucket's website
        // endpoint as its origin.
        match self
            .cdn
            .find_distribution(&distribution_comment(&self.site))
            .await?
        {
            Some(info) => {
                tracing::info!("Deleting distribution: {}", info.id);
                match self.cdn.disable_and_delete(&info.id).await {
                    Ok(()) => result.add_success(
                        format!("delete-{}", info.id),
                        format!("deleted distribution {}", info.id),
                    ),
                    Err(e) => result.add_failure(format!("delete-{}", info.id), e.to_string()),
                }
            }
            None => {
                tracing::debug!("No distribution found for site {}", self.site);
            }
        }

        if self.s3.bucket_exists(&self.bucket).await? {
            tracing::info!("Deleting bucket: {}", self.bucket);
            match self.s3.empty_and_delete_bucket(&self.bucket).await {
                Ok(()) => result.add_success(
                    format!("delete-{}", self.bucket),
                    format!("deleted bucket {}", self.bucket),
                ),
                Err(e) => result.add_failure(format!("delete-{}", self.bucket), e.to_string()),
            }
        }

        result.duration_ms = start.elapsed().as_millis() as u64;
        Ok(result)
    }
}
