//! Solution registry commands

use clap::{Args, Subcommand};

use arbor_core_types::RequestContext;
use arbor_engine::EditorService;

use super::{print_json, CliResult};

#[derive(Debug, Args)]
pub struct SolutionArgs {
    #[command(subcommand)]
    pub command: SolutionCommand,
}

#[derive(Debug, Subcommand)]
pub enum SolutionCommand {
    /// Register a new solution
    Create {
        #[arg(long)]
        name: String,
    },
    List,
    /// Print a solution with its meta
    Show {
        #[arg(long = "solution")]
        solution_id: String,
    },
    /// Replace the meta blob of a solution
    Meta {
        #[arg(long = "solution")]
        solution_id: String,
        /// Solution version the edit is based on
        #[arg(long = "version")]
        current_version: String,
        /// JSON text
        #[arg(long)]
        meta: String,
    },
}

pub fn execute(service: &EditorService, args: SolutionArgs) -> CliResult {
    let ctx = RequestContext::new();

    match args.command {
        SolutionCommand::Create { name } => print_json(&service.create_solution(&ctx, &name)?),
        SolutionCommand::List => print_json(&service.list_solutions()?),
        SolutionCommand::Show { solution_id } => {
            print_json(&service.get_solution(&ctx, &solution_id)?)
        }
        SolutionCommand::Meta {
            solution_id,
            current_version,
            meta,
        } => print_json(&service.submit_solution_meta(&ctx, &solution_id, &current_version, &meta)?),
    }
}
