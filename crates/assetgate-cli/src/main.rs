//! AssetGate CLI - Command-line interface for asset tree validation
//!
//! This binary validates directories of 3D assets against the studio
//! naming/format policy and reports structural problems per file.

use clap::{ArgAction, Parser, Subcommand};
use std::process::ExitCode;

use assetgate_cli::commands;
use assetgate_cli::logging;
use assetgate_lint::CancelFlag;

/// AssetGate - Asset validation for the VFX pipeline
#[derive(Parser)]
#[command(name = "assetgate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). ASSETGATE_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every in-policy asset under a directory
    Scan {
        /// Root directory to scan
        root: String,

        /// Path to a JSON policy file (allowed_extensions, name_rule)
        #[arg(short, long)]
        policy: Option<String>,

        /// Inspect files in parallel (output order is unchanged)
        #[arg(long)]
        parallel: bool,

        /// Output a machine-readable JSON report
        #[arg(long)]
        json: bool,
    },

    /// Check scenes and nodes of every .gltf file, ignoring the naming policy
    GltfMeta {
        /// Root directory to scan
        root: String,
    },

    /// List asset files with their type and size
    List {
        /// Root directory to list
        root: String,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the effective policy and inspector mapping
    Policy {
        /// Path to a JSON policy file
        #[arg(short, long)]
        policy: Option<String>,

        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Scan {
            root,
            policy,
            parallel,
            json,
        } => {
            let cancel = CancelFlag::new();
            let handler_flag = cancel.clone();
            let handler = move || {
                if commands::scan::on_interrupt(&handler_flag) == commands::scan::Interrupt::Exit {
                    eprintln!("{}: interrupted", colored::Colorize::red("error"));
                    std::process::exit(i32::from(commands::scan::EXIT_CANCELLED));
                }
            };
            if let Err(e) = ctrlc::set_handler(handler) {
                tracing::warn!("could not install Ctrl-C handler: {}", e);
            }
            commands::scan::run(
                &commands::scan::ScanArgs {
                    root,
                    policy,
                    parallel,
                    json,
                },
                cancel,
            )
        }
        Commands::GltfMeta { root } => commands::gltf_meta::run(&root),
        Commands::List { root, json } => commands::list::run(&root, json),
        Commands::Policy { policy, json } => commands::policy::run(policy.as_deref(), json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
