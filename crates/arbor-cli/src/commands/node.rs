//! Node edit commands
//!
//! Every mutation takes the asset id and the version the caller last saw.
//! Output is the modification as JSON, or a text summary with `--summary`.

use clap::{Args, Subcommand};

use arbor_core::diff::render_diff_summary;
use arbor_core::errors::{ArborError, ExError};
use arbor_core::model::{NodeSettings, NodeType, Position};
use arbor_core::NodeMovement;
use arbor_core_types::RequestContext;
use arbor_engine::{EditorService, Modification};

use super::{print_json, CliResult};

#[derive(Debug, Args)]
pub struct NodeArgs {
    /// Print a readable change list instead of JSON
    #[arg(long, global = true)]
    pub summary: bool,

    #[command(subcommand)]
    pub command: NodeCommand,
}

/// Asset and the version the edit is based on
#[derive(Debug, Args)]
pub struct Target {
    #[arg(long = "asset")]
    pub asset_id: String,
    #[arg(long = "version")]
    pub version: String,
}

#[derive(Debug, Subcommand)]
pub enum NodeCommand {
    /// Add a detached node
    Create {
        #[command(flatten)]
        target: Target,
        /// bt_selector, bt_sequence or bt_task
        #[arg(long = "type")]
        node_type: String,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        x: f32,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        y: f32,
        /// Settings payload as JSON text
        #[arg(long)]
        settings: Option<String>,
    },
    /// Reposition nodes, given as ID=X,Y
    Move {
        #[command(flatten)]
        target: Target,
        #[arg(long = "to", required = true, value_parser = parse_movement, allow_hyphen_values = true)]
        movements: Vec<NodeMovement>,
    },
    /// Delete nodes and detach their children
    Remove {
        #[command(flatten)]
        target: Target,
        #[arg(long = "node", required = true)]
        node_ids: Vec<String>,
    },
    /// Attach a child under a parent
    Connect {
        #[command(flatten)]
        target: Target,
        #[arg(long)]
        parent: String,
        #[arg(long)]
        child: String,
    },
    /// Detach nodes from their parents
    Disconnect {
        #[command(flatten)]
        target: Target,
        #[arg(long = "node", required = true)]
        node_ids: Vec<String>,
    },
    /// Replace a node's settings; omit --settings to clear them
    Settings {
        #[command(flatten)]
        target: Target,
        #[arg(long = "node")]
        node_id: String,
        #[arg(long)]
        settings: Option<String>,
    },
    /// Print one node
    Get {
        #[arg(long = "asset")]
        asset_id: String,
        #[arg(long = "node")]
        node_id: String,
    },
}

pub fn execute(service: &EditorService, args: NodeArgs) -> CliResult {
    let ctx = RequestContext::new();

    let modification = match args.command {
        NodeCommand::Create {
            target,
            node_type,
            x,
            y,
            settings,
        } => {
            let node_type = NodeType::parse(&node_type).map_err(ExError::from)?;
            service.create_node(
                &ctx,
                &target.asset_id,
                &target.version,
                node_type,
                Position::new(x, y),
                parse_settings(settings)?,
            )?
        }
        NodeCommand::Move { target, movements } => {
            service.move_nodes(&ctx, &target.asset_id, &target.version, movements)?
        }
        NodeCommand::Remove { target, node_ids } => {
            service.remove_nodes(&ctx, &target.asset_id, &target.version, node_ids)?
        }
        NodeCommand::Connect {
            target,
            parent,
            child,
        } => service.connect_node(&ctx, &target.asset_id, &target.version, &parent, &child)?,
        NodeCommand::Disconnect { target, node_ids } => {
            service.disconnect_nodes(&ctx, &target.asset_id, &target.version, node_ids)?
        }
        NodeCommand::Settings {
            target,
            node_id,
            settings,
        } => service.update_node_settings(
            &ctx,
            &target.asset_id,
            &target.version,
            &node_id,
            parse_settings(settings)?,
        )?,
        NodeCommand::Get { asset_id, node_id } => {
            return print_json(&service.get_node(&ctx, &asset_id, &node_id)?);
        }
    };

    if args.summary {
        print_summary(&modification);
        Ok(())
    } else {
        print_json(&modification)
    }
}

fn print_summary(modification: &Modification) {
    print!("{}", render_diff_summary(&modification.diffs));
    println!(
        "version: {} -> {}",
        modification.prev_version, modification.new_version
    );
}

fn parse_settings(settings: Option<String>) -> Result<Option<NodeSettings>, ExError> {
    settings
        .map(NodeSettings::from_json)
        .transpose()
        .map_err(ExError::from)
}

/// Parse `ID=X,Y`
fn parse_movement(raw: &str) -> Result<NodeMovement, String> {
    let invalid = || {
        ArborError::InvalidInput {
            reason: format!("expected ID=X,Y, got '{}'", raw),
        }
        .to_string()
    };

    let (node_id, coords) = raw.rsplit_once('=').ok_or_else(invalid)?;
    let (x, y) = coords.split_once(',').ok_or_else(invalid)?;
    let x: f32 = x.trim().parse().map_err(|_| invalid())?;
    let y: f32 = y.trim().parse().map_err(|_| invalid())?;
    if node_id.is_empty() {
        return Err(invalid());
    }

    Ok(NodeMovement::new(node_id, x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_movement() {
        let movement = parse_movement("n1=10.5,-3").unwrap();
        assert_eq!(movement.node_id, "n1");
        assert_eq!(movement.to_position, Position::new(10.5, -3.0));
    }

    #[test]
    fn test_parse_movement_rejects_garbage() {
        assert!(parse_movement("n1").is_err());
        assert!(parse_movement("=1,2").is_err());
        assert!(parse_movement("n1=a,2").is_err());
    }
}
