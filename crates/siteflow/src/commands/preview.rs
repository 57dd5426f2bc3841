use crate::utils;
use colored::Colorize;
use siteflow_cloud::CloudProvider;
use siteflow_cloud_aws::AwsProvider;

pub async fn handle(
    config: &siteflow_config::SiteConfig,
    stage: Option<String>,
) -> anyhow::Result<()> {
    let stage_name = utils::determine_stage_name(stage);
    let stage = config.stage(&stage_name);

    println!("Site: {}", config.name.cyan());
    println!("Stage: {}", stage_name.cyan());
    println!();

    let spec = utils::site_spec(&stage);
    let desired = siteflow_cloud::desired_site(&spec);

    let provider = AwsProvider::connect(stage.region(), &spec.site, &spec.bucket).await;

    let auth = provider.check_auth().await?;
    if !auth.authenticated {
        anyhow::bail!(
            "AWS authentication failed: {}",
            auth.error.as_deref().unwrap_or("unknown error")
        );
    }

    println!("{}", "Plan:".bold());
    let plan = provider.plan(&desired).await?;
    utils::print_plan(&plan);

    if plan.has_changes {
        println!();
        println!("Run {} to apply these changes.", "site up".cyan());
    }

    Ok(())
}
