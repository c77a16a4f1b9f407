//! bzljvm CLI entry point
//!
//! Parses arguments, runs the selected command, and renders failures through
//! [`user_friendly_error`] before exiting with status 1.
//!
//! Commands:
//! - `roots` / `leaves` - graph endpoints
//! - `order` - dependency order of a label selection
//! - `cycles` - mutually dependent label groups
//! - `classpath` - resolved project classpath

use anyhow::Result;
use bzljvm::cli;
use bzljvm::core::error::user_friendly_error;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute().await {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
