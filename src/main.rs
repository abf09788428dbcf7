#![allow(missing_docs)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

mod cmd;

#[derive(Parser)]
#[command(name = "qtdecode", about = "Qt 5 container inspection over captured memory snapshots")]
struct Cli {
	/// Formatter configuration (JSON).
	#[arg(long, global = true)]
	config: Option<PathBuf>,
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	Info(cmd::info::Args),
	Show(cmd::show::Args),
	Classify(cmd::classify::Args),
	Sample(cmd::sample::Args),
}

fn main() {
	// RUST_LOG overrides the default level.
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
	fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();

	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> qtdecode::qt::Result<()> {
	let cli = Cli::parse();
	let registry = cmd::util::load_registry(cli.config.as_deref())?;

	match cli.command {
		Commands::Info(args) => cmd::info::run(args),
		Commands::Show(args) => cmd::show::run(args, &registry),
		Commands::Classify(args) => cmd::classify::run(args, &registry),
		Commands::Sample(args) => cmd::sample::run(args),
	}
}
