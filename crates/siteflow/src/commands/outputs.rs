use crate::utils;
use colored::Colorize;
use siteflow_cloud::{StateManager, resource};
use siteflow_cloud_aws::{AwsProvider, SiteOutputs};

pub async fn handle(
    config: &siteflow_config::SiteConfig,
    project_root: &std::path::Path,
    stage: Option<String>,
) -> anyhow::Result<()> {
    let stage_name = utils::determine_stage_name(stage);
    let stage = config.stage(&stage_name);
    let spec = utils::site_spec(&stage);

    // The last converge recorded the distribution domain; prefer that over
    // a round trip to the API.
    let state_manager = StateManager::new(project_root);
    if let Ok(state) = state_manager.load().await {
        let key = format!("aws:{}:{}", resource::DISTRIBUTION, spec.site);
        if let Some(recorded) = state.get_resource(&key) {
            if let Some(domain) = recorded.get_attribute::<String>("domain_name") {
                utils::print_outputs(&SiteOutputs::new(&spec.bucket, stage.region(), &domain));
                return Ok(());
            }
        }
    }

    let provider = AwsProvider::connect(stage.region(), &spec.site, &spec.bucket).await;
    match provider.outputs().await? {
        Some(outputs) => utils::print_outputs(&outputs),
        None => {
            println!(
                "{}",
                format!(
                    "No distribution found for stage '{}'. Run `site up` first.",
                    stage_name
                )
                .yellow()
            );
        }
    }

    Ok(())
}
