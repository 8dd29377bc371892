use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cxx_stager::config::{CONFIG_FILE_NAME, LoadedConfig, discover_config, init_template};
use cxx_stager::stage::Stager;

#[derive(Parser)]
#[command(name = "cxx-stage")]
#[command(
	author,
	version,
	about = "Stage cxx bridge bindings and libraries for the C++ example build"
)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Path to the native build output directory (default: ../target/release)
	#[arg(long = "target-dir", alias = "target_dir", value_name = "PATH", global = true)]
	target_dir: Option<PathBuf>,

	/// Config file to use instead of ./.cxx-stage.toml
	#[arg(long, value_name = "PATH", global = true)]
	config: Option<PathBuf>,

	/// Create a template .cxx-stage.toml in the current directory
	#[arg(long)]
	init: bool,

	/// Overwrite existing .cxx-stage.toml when using --init
	#[arg(long, requires = "init")]
	force: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// Configuration management commands
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
}

#[derive(Subcommand)]
enum ConfigAction {
	/// Display the effective configuration and where it came from
	Show,
	/// Check the config file for errors without staging anything
	Validate,
}

fn main() -> ExitCode {
	init_tracing();

	match run() {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn init_tracing() {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| "cxx_stager=info,cxx_stage=info".into());

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.init();
}

fn run() -> Result<ExitCode> {
	let cli = Cli::parse();

	// Handle --init
	if cli.init {
		return handle_init(cli.force);
	}

	let cwd = std::env::current_dir().context("Failed to get current directory")?;

	// Handle subcommands
	if let Some(command) = cli.command {
		return match command {
			Commands::Config { action } => match action {
				ConfigAction::Show => {
					handle_config_show(&cwd, cli.config.as_deref(), cli.target_dir)
				}
				ConfigAction::Validate => handle_config_validate(&cwd, cli.config.as_deref()),
			},
		};
	}

	handle_stage(&cwd, cli.config.as_deref(), cli.target_dir)
}

fn load_config(
	cwd: &Path,
	explicit: Option<&Path>,
	target_dir: Option<PathBuf>,
) -> Result<LoadedConfig> {
	let mut loaded = discover_config(cwd, explicit).context("Failed to load configuration")?;

	// Command line wins over the config file
	if let Some(target_dir) = target_dir {
		loaded.config.target_dir = target_dir;
	}
	Ok(loaded)
}

fn handle_init(force: bool) -> Result<ExitCode> {
	let config_path = PathBuf::from(CONFIG_FILE_NAME);

	if config_path.exists() && !force {
		anyhow::bail!("{CONFIG_FILE_NAME} already exists. Use --force to overwrite.");
	}

	let template = init_template().context("Failed to build config template")?;
	std::fs::write(&config_path, template)
		.with_context(|| format!("Failed to write {}", config_path.display()))?;

	println!("Created {CONFIG_FILE_NAME}");
	Ok(ExitCode::SUCCESS)
}

fn handle_config_show(
	cwd: &Path,
	explicit: Option<&Path>,
	target_dir: Option<PathBuf>,
) -> Result<ExitCode> {
	let loaded = load_config(cwd, explicit, target_dir)?;

	match &loaded.path {
		Some(path) => println!("# Source: {}", path.display()),
		None => println!("# Source: built-in defaults"),
	}
	println!();

	let rendered =
		toml::to_string_pretty(&loaded.config).context("Failed to render configuration")?;
	print!("{rendered}");

	Ok(ExitCode::SUCCESS)
}

fn handle_config_validate(cwd: &Path, explicit: Option<&Path>) -> Result<ExitCode> {
	match discover_config(cwd, explicit) {
		Ok(LoadedConfig { path: Some(path), .. }) => {
			println!("Configuration is valid: {}", path.display());
			Ok(ExitCode::SUCCESS)
		}
		Ok(LoadedConfig { path: None, .. }) => {
			println!("No configuration file found; built-in defaults are in effect.");
			Ok(ExitCode::SUCCESS)
		}
		Err(e) => {
			eprintln!("Configuration error: {}", e);
			if let Some(source) = std::error::Error::source(&e) {
				eprintln!("  caused by: {}", source);
			}
			Ok(ExitCode::FAILURE)
		}
	}
}

fn handle_stage(
	cwd: &Path,
	explicit: Option<&Path>,
	target_dir: Option<PathBuf>,
) -> Result<ExitCode> {
	let loaded = load_config(cwd, explicit, target_dir)?;
	info!(target_dir = %loaded.config.target_dir.display(), "using target directory");

	let report = Stager::new(loaded.config).run().context("Staging failed")?;

	info!(
		skipped_native = report.skipped_native,
		bindings = report.bindings_copied,
		rewritten = report.bindings_rewritten + report.companions_rewritten,
		renamed = report.renamed,
		libraries = report.libraries,
		companions = report.companions_copied,
		examples = report.examples,
		"staging complete"
	);
	Ok(ExitCode::SUCCESS)
}
