use crate::utils;
use colored::Colorize;
use siteflow_cloud::{CloudProvider, GlobalState, StateManager};
use siteflow_cloud_aws::AwsProvider;

pub async fn handle(
    config: &siteflow_config::SiteConfig,
    project_root: &std::path::Path,
    stage: Option<String>,
    yes: bool,
) -> anyhow::Result<()> {
    let stage_name = utils::determine_stage_name(stage);
    let stage = config.stage(&stage_name);
    let spec = utils::site_spec(&stage);

    println!("Site: {}", config.name.cyan());
    println!("Stage: {}", stage_name.cyan());
    println!();

    if !yes {
        println!(
            "{}",
            format!(
                "This deletes the distribution and bucket '{}' including every uploaded object.",
                spec.bucket
            )
            .yellow()
        );
        println!("Re-run with {} to confirm.", "--yes".cyan());
        return Ok(());
    }

    let provider = AwsProvider::connect(stage.region(), &spec.site, &spec.bucket).await;

    let auth = provider.check_auth().await?;
    if !auth.authenticated {
        anyhow::bail!(
            "AWS authentication failed: {}",
            auth.error.as_deref().unwrap_or("unknown error")
        );
    }

    let state_manager = StateManager::new(project_root);
    let _lock = state_manager.acquire_lock().await?;

    println!("{}", "Destroying...".blue());
    let result = provider.destroy_all().await?;
    let ok = utils::print_apply_result(&result);

    // Drop everything this provider had recorded for the stage.
    let mut state = state_manager.load().await.unwrap_or_else(|_| GlobalState::new());
    let keys: Vec<String> = state
        .get_provider_resources(provider.name())
        .iter()
        .map(|(key, _)| (*key).clone())
        .collect();
    for key in keys {
        state.remove_resource(&key);
    }
    state_manager.save(&state).await?;

    if !ok {
        anyhow::bail!("destroy failed for stage '{}'", stage_name);
    }

    Ok(())
}
