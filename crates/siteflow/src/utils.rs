use colored::Colorize;
use siteflow_cloud::{ActionType, ApplyResult, Plan};
use siteflow_cloud_aws::SiteOutputs;
use siteflow_config::StageConfig;

/// Resolve the stage name. Positional argument and SITE_STAGE are handled
/// by clap; everything else falls back to "dev".
pub fn determine_stage_name(stage: Option<String>) -> String {
    stage.unwrap_or_else(|| "dev".to_string())
}

/// Build the resource declaration for a resolved stage.
///
/// The stage-qualified name `{site}-{stage}` is both the bucket name and
/// the deployment identity, so two stages of one site never collide.
pub fn site_spec(stage: &StageConfig) -> siteflow_cloud::SiteSpec {
    siteflow_cloud::SiteSpec {
        site: stage.bucket_name(),
        bucket: stage.bucket_name(),
        provider: "aws".to_string(),
        source_path: stage.source_path().to_string(),
        index_document: stage.index_document().to_string(),
        error_document: stage.error_document().to_string(),
    }
}

/// Print a plan, one line per action.
pub fn print_plan(plan: &Plan) {
    for action in &plan.actions {
        let marker = match action.action_type {
            ActionType::Create => "+".green(),
            ActionType::Update => "~".yellow(),
            ActionType::Delete => "-".red(),
            ActionType::NoOp => "·".dimmed(),
        };
        println!("  {} {}", marker, action.description);
    }
    println!();
    println!("{}", plan.summary().to_string().bold());
}

/// Print an apply result; returns false if anything failed.
pub fn print_apply_result(result: &ApplyResult) -> bool {
    for ok in &result.succeeded {
        println!("  {} {}", "✓".green(), ok.message);
    }
    for failed in &result.failed {
        println!(
            "  {} {}: {}",
            "✗".red(),
            failed.action_id,
            failed.error.as_deref().unwrap_or("unknown error")
        );
    }
    println!();
    if result.is_success() {
        println!(
            "{}",
            format!("✓ Converged in {}ms", result.duration_ms).green().bold()
        );
        true
    } else {
        println!("{}", "✗ Converge failed".red().bold());
        false
    }
}

/// Print the four site outputs.
pub fn print_outputs(outputs: &SiteOutputs) {
    println!("{}", "Outputs:".bold());
    println!("  origin_url       {}", outputs.origin_url.cyan());
    println!("  origin_hostname  {}", outputs.origin_hostname.cyan());
    println!("  cdn_url          {}", outputs.cdn_url.cyan());
    println!("  cdn_hostname     {}", outputs.cdn_hostname.cyan());
}
