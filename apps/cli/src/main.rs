//! Notecraft CLI: turn interview-prep conversations into structured study notes.
//!
//! Synthesizes notes from Q&A transcripts, merges them into an existing notes
//! checkout, and self-reviews every note before it is saved.

mod commands;
mod store;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
