use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use console::style;
use indexmap::IndexMap;

use appfig::{ConfigInstaller, FacadeOutcome, ProviderInstall};

#[derive(Parser, Debug)]
#[command(name = "appfig")]
#[command(about = "Register package service providers and facades in config/app.php")]
struct Args {
    /// Laravel application root
    #[arg(short = 'd', long, default_value = ".")]
    app_root: PathBuf,

    /// Composer package name (vendor/name)
    #[arg(short, long)]
    package: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check whether the package's service provider is registered
    Status {
        /// Provider file name within the package (e.g. ServiceProvider.php)
        provider_file: String,
    },

    /// Register the package's service provider
    Install {
        provider_file: String,
    },

    /// Ensure the shared core provider entry exists
    Core,

    /// Register facade aliases, given as NAME=Fully\Qualified\Facade pairs
    Facades {
        #[arg(value_name = "NAME=CLASS", required = true)]
        pairs: Vec<String>,
    },

    /// List providers the package declares for auto-discovery
    Discover,
}

fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", style("Error:").red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let app_root = args
        .app_root
        .canonicalize()
        .context("Failed to resolve application root")?;
    log::debug!("Using application root {}", app_root.display());
    let installer = ConfigInstaller::new(app_root, args.package);

    match args.command {
        Commands::Status { provider_file } => {
            let installed = installer.is_package_installed(&provider_file)?;
            if installed {
                println!("{} provider is registered", style("OK").green().bold());
            } else {
                println!("{} provider is not registered", style("Missing").yellow().bold());
            }
        }

        Commands::Install { provider_file } => match installer.install_service_provider(&provider_file)? {
            ProviderInstall::Installed(class) => {
                println!("{} registered {class}", style("Installed").green().bold());
            }
            ProviderInstall::AlreadyInstalled => {
                println!("{} provider already registered", style("Skipped").cyan());
            }
        },

        Commands::Core => {
            if installer.add_core_provider()? {
                println!("{} core provider registered", style("Installed").green().bold());
            } else {
                println!("{} core provider already present", style("Skipped").cyan());
            }
        }

        Commands::Facades { pairs } => {
            let aliases = parse_alias_pairs(&pairs)?;
            match installer.install_facades(&aliases)? {
                FacadeOutcome::Applied => {
                    println!("{} facade aliases registered", style("Installed").green().bold());
                }
                FacadeOutcome::Unsupported => {
                    println!(
                        "{} config file has no aliases block, nothing changed",
                        style("Skipped").yellow()
                    );
                }
            }
        }

        Commands::Discover => {
            for provider in installer.discover_providers()? {
                println!("{provider}");
            }
        }
    }

    Ok(())
}

fn parse_alias_pairs(pairs: &[String]) -> Result<IndexMap<String, String>> {
    let mut aliases = IndexMap::new();
    for pair in pairs {
        let Some((name, class)) = pair.split_once('=') else {
            bail!("invalid facade pair '{pair}', expected NAME=CLASS");
        };
        if name.is_empty() || class.is_empty() {
            bail!("invalid facade pair '{pair}', expected NAME=CLASS");
        }
        aliases.insert(name.to_string(), class.to_string());
    }
    Ok(aliases)
}
