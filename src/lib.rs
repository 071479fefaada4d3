#![doc = include_str!("../README.md")]

pub mod cli;
pub mod command;
pub mod discovery;
pub mod error;
pub mod fs;
pub mod manifest;
pub mod patch;
pub mod workspace;

pub use error::*;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn run() -> Result<()> {
    use clap::Parser;
    use cli::Command;

    env_logger::init();

    let cli = cli::Cli::parse();
    match cli.command {
        Command::List(args) => command::list::execute(args),
        Command::Set(args) => command::set::execute(args),
    }
}
