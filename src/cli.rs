use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "podtrack",
    version,
    about = "Inspect and maintain podcast playback positions shared over redis"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    List,
    Status,
    Purge,
}
