//! meshstat CLI - Status checker for a Consul service mesh on Kubernetes

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod display;
mod error;
mod exit_codes;
mod logging;

#[derive(Parser)]
#[command(name = "meshstat")]
#[command(author = "meshstat Contributors")]
#[command(version)]
#[command(about = "Report the health of a Consul installation on Kubernetes", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the status of the Consul installation
    Status(StatusArgs),
}

/// Flags for the status command
#[derive(Args, Debug, Default)]
pub struct StatusArgs {
    /// Path to the kubeconfig file
    #[arg(short = 'c', long)]
    pub kubeconfig: Option<PathBuf>,

    /// Kubernetes context to use
    #[arg(long)]
    pub context: Option<String>,

    /// Helm storage driver (secret, configmap or memory)
    #[arg(long, env = "HELM_DRIVER", default_value = "secret")]
    pub storage_driver: String,

    /// Rejected with a usage error; status takes flags only
    #[arg(hide = true)]
    pub extra: Vec<String>,
}

fn main() {
    miette::set_panic_hook();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not failures
            let code = if e.use_stderr() {
                exit_codes::ERROR
            } else {
                exit_codes::SUCCESS
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    logging::init(cli.debug);

    let result = match cli.command {
        Commands::Status(args) => commands::status::run(&args),
    };

    if let Err(err) = result {
        if !err.already_reported() {
            eprintln!("{:?}", miette::Report::new(err.clone()));
        }
        std::process::exit(err.exit_code());
    }
}
