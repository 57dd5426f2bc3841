use crate::utils;
use colored::Colorize;
use siteflow_cloud::{CloudProvider, GlobalState, StateManager};
use siteflow_cloud_aws::AwsProvider;

pub async fn handle(
    config: &siteflow_config::SiteConfig,
    project_root: &std::path::Path,
    stage: Option<String>,
) -> anyhow::Result<()> {
    let stage_name = utils::determine_stage_name(stage);
    let stage = config.stage(&stage_name);

    println!("Site: {}", config.name.cyan());
    println!("Stage: {}", stage_name.cyan());
    println!("Region: {}", stage.region().cyan());
    println!();

    let mut spec = utils::site_spec(&stage);
    // The sync path from the site file is relative to the site file itself.
    // A missing directory is not checked here; it fails inside the sync
    // action when the converge reaches it.
    spec.source_path = project_root.join(stage.source_path()).display().to_string();

    let desired = siteflow_cloud::desired_site(&spec);
    tracing::debug!("declared {} resources for {}", desired.resources.len(), spec.site);

    println!("{}", "Connecting to AWS...".blue());
    let provider = AwsProvider::connect(stage.region(), &spec.site, &spec.bucket).await;

    let auth = provider.check_auth().await?;
    if !auth.authenticated {
        anyhow::bail!(
            "AWS authentication failed: {}",
            auth.error.as_deref().unwrap_or("unknown error")
        );
    }
    if let Some(info) = &auth.account_info {
        println!("  {} {}", "✓".green(), info);
    }

    let state_manager = StateManager::new(project_root);
    let _lock = state_manager.acquire_lock().await?;

    println!();
    println!("{}", "Plan:".bold());
    let plan = provider.plan(&desired).await?;
    utils::print_plan(&plan);

    println!();
    println!("{}", "Applying...".blue());
    let result = provider.apply(&plan).await?;
    let ok = utils::print_apply_result(&result);

    // Record what the provider reports after the apply, even on partial
    // failure, so the next converge starts from reality.
    let provider_state = provider.get_state().await?;
    let mut state = state_manager.load().await.unwrap_or_else(|_| GlobalState::new());
    sync_provider_state(&mut state, provider.name(), &provider_state);
    state_manager.save(&state).await?;

    if !ok {
        anyhow::bail!("converge failed for stage '{}'", stage_name);
    }

    println!();
    match provider.outputs().await? {
        Some(outputs) => utils::print_outputs(&outputs),
        None => println!("{}", "Distribution not visible yet; run `site outputs` shortly.".yellow()),
    }

    Ok(())
}

/// Replace the recorded resources for one provider with a fresh snapshot.
fn sync_provider_state(
    state: &mut GlobalState,
    provider: &str,
    snapshot: &siteflow_cloud::ProviderState,
) {
    let stale: Vec<String> = state
        .get_provider_resources(provider)
        .iter()
        .map(|(key, _)| (*key).clone())
        .collect();
    for key in stale {
        state.remove_resource(&key);
    }
    for (id, resource) in snapshot.iter() {
        state.set_resource(format!("{}:{}", provider, id), resource.clone());
    }
}
