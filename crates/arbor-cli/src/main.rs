//! Arbor CLI
//!
//! Command-line front end for editing stored behaviour trees

use clap::{Parser, Subcommand, ValueEnum};

use arbor_core::logging_facility::{init, Profile};

mod commands;

#[derive(Debug, Parser)]
#[command(name = "arbor")]
#[command(about = "Arbor - versioned behaviour-tree editing", long_about = None)]
struct Cli {
    /// SQLite database holding the assets
    #[arg(long, global = true, default_value = ".arbor/store.db")]
    db: String,

    /// Log output format (logs go to stderr)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Solution registry operations
    Solution(commands::solution::SolutionArgs),
    /// Asset set registry operations
    Set(commands::set::SetArgs),
    /// Asset registry operations
    Asset(commands::asset::AssetArgs),
    /// Node edits on one behaviour tree
    Node(commands::node::NodeArgs),
}

fn main() {
    let cli = Cli::parse();

    init(match cli.log_format {
        LogFormat::Pretty => Profile::Development,
        LogFormat::Json => Profile::Production,
    });

    let result = commands::open_service(&cli.db).and_then(|service| match cli.command {
        Commands::Solution(args) => commands::solution::execute(&service, args),
        Commands::Set(args) => commands::set::execute(&service, args),
        Commands::Asset(args) => commands::asset::execute(&service, args),
        Commands::Node(args) => commands::node::execute(&service, args),
    });

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
