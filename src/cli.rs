use clap::{Parser, Subcommand};

use crate::command::list::ListArgs;
use crate::command::set::SetArgs;

#[derive(Parser)]
#[command(name = "polyver", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the packages of a workspace.
    List(ListArgs),

    /// Update a package's version and/or its dependency ranges in place.
    Set(SetArgs),
}
