//! dockhand - container dashboard for the terminal

mod debug_log;
mod preflight;
mod selector;

use clap::{ArgAction, Parser, Subcommand};
use debug_log::{DebugLog, LOG_ENV};
use dockhand_config::Settings;
use dockhand_runtime::{create_client, RuntimeClient};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "dockhand")]
#[command(author, about = "htop-like dashboard for Docker and Podman containers", long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::SetTrue)]
    version: bool,

    /// Choose the container runtime (docker or podman) before launching
    #[arg(long)]
    runtime: bool,

    /// Write debug logs to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Verbose logging (only with a log file)
    #[arg(long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version
    Version,
    /// Show how to update dockhand
    Update,
}

// Single-threaded so the scoped log subscriber covers every background task
#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.version {
        print_version();
        return Ok(());
    }
    match cli.command {
        Some(Commands::Version) => {
            print_version();
            return Ok(());
        }
        Some(Commands::Update) => {
            print_update();
            return Ok(());
        }
        None => {}
    }

    let log_path = cli
        .log_file
        .or_else(|| std::env::var_os(LOG_ENV).map(PathBuf::from));
    let _log = DebugLog::open(log_path.as_deref(), cli.verbose)?;

    let mut settings = Settings::load();

    if cli.runtime {
        let kind = selector::select_runtime(settings.runtime.kind).await?;
        settings.runtime.kind = kind;
        if let Err(e) = settings.save() {
            eprintln!("Warning: Could not save runtime selection: {}", e);
        } else {
            eprintln!("Runtime '{}' saved to config", kind);
        }
    }

    let client: Arc<dyn RuntimeClient> = Arc::from(create_client(settings.runtime.kind));
    preflight::check(client.as_ref()).await?;

    dockhand_tui::run(client, settings).await?;
    Ok(())
}

fn print_version() {
    println!("dockhand {}", env!("CARGO_PKG_VERSION"));
}

fn print_update() {
    println!("dockhand {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("To update, reinstall from crates.io:");
    println!("  cargo install dockhand-cli --force");
}
