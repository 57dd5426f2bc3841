mod commands;
mod utils;

use clap::{Parser, Subcommand};
use colored::Colorize;

#[derive(Parser)]
#[command(name = "site")]
#[command(about = "Declare it once. Converge it anywhere.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Converge the site: bucket, sync, and distribution
    Up {
        /// Stage name (dev, stg, prod, ...)
        stage: Option<String>,
        /// Stage name (-s/--stage flag, SITE_STAGE environment variable)
        #[arg(
            short = 's',
            long = "stage",
            env = "SITE_STAGE",
            conflicts_with = "stage",
            hide = true
        )]
        stage_flag: Option<String>,
    },
    /// Show the plan without applying it
    Preview {
        /// Stage name (dev, stg, prod, ...)
        stage: Option<String>,
        /// Stage name (-s/--stage flag, SITE_STAGE environment variable)
        #[arg(
            short = 's',
            long = "stage",
            env = "SITE_STAGE",
            conflicts_with = "stage",
            hide = true
        )]
        stage_flag: Option<String>,
    },
    /// Tear down every resource managed for the stage
    Destroy {
        /// Stage name (dev, stg, prod, ...)
        stage: Option<String>,
        /// Stage name (-s/--stage flag, SITE_STAGE environment variable)
        #[arg(
            short = 's',
            long = "stage",
            env = "SITE_STAGE",
            conflicts_with = "stage",
            hide = true
        )]
        stage_flag: Option<String>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Print the origin and distribution URLs from the last converge
    Outputs {
        /// Stage name (dev, stg, prod, ...)
        stage: Option<String>,
        /// Stage name (-s/--stage flag, SITE_STAGE environment variable)
        #[arg(
            short = 's',
            long = "stage",
            env = "SITE_STAGE",
            conflicts_with = "stage",
            hide = true
        )]
        stage_flag: Option<String>,
    },
    /// Validate the site file and show the resolved declaration
    Validate {
        /// Stage name (dev, stg, prod, ...)
        stage: Option<String>,
        /// Stage name (-s/--stage flag, SITE_STAGE environment variable)
        #[arg(
            short = 's',
            long = "stage",
            env = "SITE_STAGE",
            conflicts_with = "stage",
            hide = true
        )]
        stage_flag: Option<String>,
    },
    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt::init();

    // Version needs no site file
    if matches!(cli.command, Commands::Version) {
        println!("siteflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let site_file = match siteflow_config::find_site_file() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{}", "No site file found.".yellow());
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let project_root = site_file
        .parent()
        .map(std::path::Path::to_path_buf)
        .unwrap_or_else(|| std::path::PathBuf::from("."));
    let config = siteflow_config::load(&site_file)?;

    match cli.command {
        Commands::Up { stage, stage_flag } => {
            commands::up::handle(&config, &project_root, stage.or(stage_flag)).await?;
        }
        Commands::Preview { stage, stage_flag } => {
            commands::preview::handle(&config, stage.or(stage_flag)).await?;
        }
        Commands::Destroy {
            stage,
            stage_flag,
            yes,
        } => {
            commands::destroy::handle(&config, &project_root, stage.or(stage_flag), yes).await?;
        }
        Commands::Outputs { stage, stage_flag } => {
            commands::outputs::handle(&config, &project_root, stage.or(stage_flag)).await?;
        }
        Commands::Validate { stage, stage_flag } => {
            commands::validate::handle(&config, stage.or(stage_flag))?;
        }
        Commands::Version => unreachable!(),
    }

    Ok(())
}
