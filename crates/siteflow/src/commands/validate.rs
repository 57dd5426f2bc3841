use crate::utils;
use colored::Colorize;

pub fn handle(config: &siteflow_config::SiteConfig, stage: Option<String>) -> anyhow::Result<()> {
    let stage_name = utils::determine_stage_name(stage);
    let stage = config.stage(&stage_name);

    println!("{} Site file is valid.", "✓".green());
    println!();
    println!("Site: {}", config.name.cyan());
    println!("Stage: {}", stage_name.cyan());
    println!("Region: {}", stage.region().cyan());
    println!();
    println!("{}", "Resolved settings:".bold());
    println!("  path            {}", stage.source_path().cyan());
    println!("  index_document  {}", stage.index_document().cyan());
    println!("  error_document  {}", stage.error_document().cyan());
    println!("  bucket          {}", stage.bucket_name().cyan());

    let spec = utils::site_spec(&stage);
    let desired = siteflow_cloud::desired_site(&spec);
    let ordered = desired.ordered()?;

    println!();
    println!("{}", format!("Declared resources ({}):", ordered.len()).bold());
    for resource in ordered {
        if resource.depends_on.is_empty() {
            println!("  • {}", resource.key().cyan());
        } else {
            println!(
                "  • {} (after {})",
                resource.key().cyan(),
                resource.depends_on.join(", ")
            );
        }
    }

    Ok(())
}
