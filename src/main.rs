use anyhow::Context;
use clap::{Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use voidshell::config::Config;
use voidshell::shell::{OutputFormat, Shell};
use voidshell::skin::Skin;

#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(name = "voidshell")]
#[command(about = "A tiny terminal with variables and Python-like expressions")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Run a single line and exit
    #[arg(short = 'c', long)]
    command_string: Option<String>,

    /// Execute a script file, one line per submission
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Override the configured colour skin
    #[arg(long, value_enum)]
    skin: Option<Skin>,

    /// Print entries as JSON lines instead of styled text
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },
    /// Show configuration information
    Config,
    /// Clear persisted command history
    ClearHistory,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .init();

    info!("Starting voidshell v{}", voidshell::VERSION);

    let mut config = Config::load(cli.config.as_deref())
        .await
        .context("loading configuration")?;
    if let Some(skin) = cli.skin {
        config.display.skin = skin;
    }

    if let Some(command) = cli.command {
        handle_command(command, &config, cli.config.as_deref()).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let mut shell = Shell::new(config).await?.with_format(format);

    match (cli.command_string, cli.script) {
        (Some(line), _) => {
            let outcome = shell.execute_command(&line).await?;
            if outcome.is_error() {
                return Ok(ExitCode::FAILURE);
            }
        }
        (None, Some(script_path)) => {
            let errors = shell
                .execute_script(&script_path)
                .await
                .with_context(|| format!("running script {}", script_path.display()))?;
            if errors > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }
        (None, None) => {
            shell.run_repl().await.context("interactive session failed")?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

async fn handle_command(
    command: Commands,
    config: &Config,
    config_path: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    match command {
        Commands::Init { force } => {
            let path = config.init(config_path, force).await?;
            println!("✓ Configuration initialized at {}", path.display());
        }
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(config)?);
        }
        Commands::ClearHistory => {
            config.clear_history().await?;
            println!("✓ Command history cleared");
        }
    }
    Ok(())
}
