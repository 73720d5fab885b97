//! Wikiup CLI - publish Markdown documents to Confluence.
//!
//! Reads Markdown files carrying a `wiki` front-matter block and creates
//! or updates the matching Confluence pages. Meant to run in CI after a
//! merge, where the changed files of the last commit are picked up
//! automatically, but files and directories can also be passed directly.

mod cli;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use output::Output;

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose turns on info-level logs; otherwise honor RUST_LOG.
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.execute(&output) {
        Ok(summary) => {
            if summary.has_failures() {
                std::process::exit(1);
            }
        }
        Err(err) => {
            output.error(&format!("Error: {err}"));
            std::process::exit(1);
        }
    }
}
