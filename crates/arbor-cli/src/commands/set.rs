//! Asset set commands

use clap::{Args, Subcommand};

use arbor_core_types::RequestContext;
use arbor_engine::EditorService;

use super::{print_json, CliResult};

#[derive(Debug, Args)]
pub struct SetArgs {
    #[command(subcommand)]
    pub command: SetCommand,
}

#[derive(Debug, Subcommand)]
pub enum SetCommand {
    /// Register a new asset set in a solution
    Create {
        #[arg(long = "solution")]
        solution_id: String,
        #[arg(long)]
        name: String,
    },
    /// List asset sets, optionally for one solution
    List {
        #[arg(long = "solution")]
        solution_id: Option<String>,
    },
    /// Print the archive of every behaviour tree in the given sets
    Export {
        #[arg(long = "set", required = true)]
        asset_set_ids: Vec<String>,
    },
}

pub fn execute(service: &EditorService, args: SetArgs) -> CliResult {
    let ctx = RequestContext::new();

    match args.command {
        SetCommand::Create { solution_id, name } => {
            print_json(&service.create_asset_set(&ctx, &solution_id, &name)?)
        }
        SetCommand::List { solution_id } => {
            print_json(&service.list_asset_sets(solution_id.as_deref())?)
        }
        SetCommand::Export { asset_set_ids } => {
            print_json(&service.export_asset_sets(&ctx, &asset_set_ids)?)
        }
    }
}
