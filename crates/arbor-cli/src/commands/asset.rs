//! Asset registry commands

use clap::{Args, Subcommand};

use arbor_core_types::RequestContext;
use arbor_engine::EditorService;

use super::{print_json, CliResult};

#[derive(Debug, Args)]
pub struct AssetArgs {
    #[command(subcommand)]
    pub command: AssetCommand,
}

#[derive(Debug, Subcommand)]
pub enum AssetCommand {
    /// Register a new asset
    Create {
        #[arg(long = "set")]
        asset_set_id: String,
        /// BehaviourTree or BlackBoard
        #[arg(long = "type", default_value = "BehaviourTree")]
        asset_type: String,
        #[arg(long)]
        name: String,
    },
    /// List assets, optionally for one asset set
    List {
        #[arg(long = "set")]
        asset_set_id: Option<String>,
    },
    /// Print the full stored asset, content and version included
    Read {
        #[arg(long = "asset")]
        asset_id: String,
    },
    /// Print the archive form of a behaviour tree
    Export {
        #[arg(long = "asset")]
        asset_id: String,
    },
    /// Report structural problems in a stored tree
    Check {
        #[arg(long = "asset")]
        asset_id: String,
    },
}

pub fn execute(service: &EditorService, args: AssetArgs) -> CliResult {
    let ctx = RequestContext::new();

    match args.command {
        AssetCommand::Create {
            asset_set_id,
            asset_type,
            name,
        } => print_json(&service.create_asset(&ctx, &asset_set_id, &asset_type, &name)?),
        AssetCommand::List { asset_set_id } => {
            print_json(&service.list_assets(asset_set_id.as_deref())?)
        }
        AssetCommand::Read { asset_id } => print_json(&service.read_asset(&ctx, &asset_id)?),
        AssetCommand::Export { asset_id } => print_json(&service.export_asset(&ctx, &asset_id)?),
        AssetCommand::Check { asset_id } => print_json(&service.check_asset(&ctx, &asset_id)?),
    }
}
