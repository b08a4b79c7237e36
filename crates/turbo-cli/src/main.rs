//! turbo CLI - Project and component scaffolding from npm-published templates

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use turbo_core::commands::Command as _;
use turbo_core::{
    logging, resolve_plugin, run_plugin, CliConfig, ClackPrompter, GlobalFlags, InitArgs,
    InitCommand, InitOutcome, LogLevel, PluginInvocation, ProductConfig,
};

/// CLI version
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Commands `turbo` knows, listed when an unknown one is given
const KNOWN_COMMANDS: &[&str] = &["init"];

/// turbo product configuration
#[derive(Clone)]
pub struct TurboConfig;

impl ProductConfig for TurboConfig {
    fn name(&self) -> &'static str {
        "turbo"
    }

    fn display_name(&self) -> &'static str {
        "Turbo CLI"
    }

    fn default_cli_home(&self) -> &'static str {
        ".turbo-cli"
    }

    fn default_template_url(&self) -> &'static str {
        "https://raw.githubusercontent.com/turbo-cli-dev/templates/main/catalog.yaml"
    }

    fn cli_description(&self) -> &'static str {
        "CLI for scaffolding projects and components from npm-published templates"
    }

    fn user_agent(&self) -> &'static str {
        concat!("turbo-cli/", env!("CARGO_PKG_VERSION"))
    }
}

#[derive(Parser, Debug)]
#[command(name = "turbo")]
#[command(about = "CLI for scaffolding projects and components from npm-published templates")]
#[command(version)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Run commands from a local package instead of the cached one (for development use)
    #[arg(long = "target-path", global = true)]
    pub target_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new project or component in the current directory
    Init {
        /// Project name; asked for when missing or invalid
        project_name: Option<String>,

        /// Skip the first confirmation for a non-empty directory
        #[arg(short, long)]
        force: bool,
    },

    #[command(external_subcommand)]
    External(Vec<String>),
}

#[tokio::main]
async fn main() {
    // Ensure terminal cursor is restored on panic
    let default_panic = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = console::Term::stderr().show_cursor();
        default_panic(info);
    }));

    // Handle Ctrl+C gracefully
    ctrlc::set_handler(move || {
        let _ = console::Term::stderr().show_cursor();
        std::process::exit(130);
    })
    .ok();

    let args = Args::parse();
    let product = TurboConfig;
    let debug = args.debug;
    let mut log_level = None;

    let code = match run(&product, args, &mut log_level).await {
        Ok(code) => code,
        Err(e) => {
            // Configuration errors can happen before logging is set up
            let level = log_level.unwrap_or_else(|| CliConfig::fallback_log_level(debug));
            logging::init(level);
            tracing::error!("{:#}", e);
            if level.is_verbose() {
                eprintln!("{:?}", e);
            }
            1
        }
    };

    // Ensure cursor is visible on normal exit
    let _ = console::Term::stderr().show_cursor();
    std::process::exit(code);
}

async fn run<C: ProductConfig>(
    product: &C,
    args: Args,
    log_level: &mut Option<LogLevel>,
) -> Result<i32> {
    let command = match args.command {
        Some(Command::External(argv)) => {
            let name = argv.first().map(String::as_str).unwrap_or_default();
            eprintln!("{} unknown command '{}'", "error:".red().bold(), name);
            eprintln!("Available commands: {}", KNOWN_COMMANDS.join(", ").cyan());
            return Ok(1);
        }
        Some(command) => command,
        None => {
            Args::command().print_help()?;
            return Ok(0);
        }
    };

    let flags = GlobalFlags {
        debug: args.debug,
        target_path: args.target_path,
    };
    let config = CliConfig::load(product, &flags).context("failed to load configuration")?;
    *log_level = Some(config.log_level);
    logging::init(config.log_level);
    tracing::info!("{} {}", product.display_name(), CLI_VERSION);
    tracing::debug!(cli_home = %config.cli_home.display(), registry = %config.registry, "configuration loaded");

    match command {
        Command::Init { project_name, force } => {
            if let Some(plugin) = resolve_plugin(product, &config, "init").await? {
                let mut invocation = PluginInvocation::new("init").option("force", force);
                if let Some(name) = &project_name {
                    invocation = invocation.arg(name);
                }
                return Ok(run_plugin(&config, &plugin, &invocation).await?);
            }

            let directory =
                std::env::current_dir().context("failed to read the current directory")?;
            let mut init = InitCommand::new(&config, ClackPrompter::new());
            let outcome = init
                .run(InitArgs {
                    project_name,
                    force,
                    directory,
                })
                .await?;

            if let InitOutcome::Created(project) = outcome {
                tracing::debug!(project = %project.project_name, "init finished");
            }
            Ok(0)
        }
        Command::External(_) => Ok(1),
    }
}
