//! Command line interface for the shell app builder.
//!
//! Parses and validates arguments, then hands the normalized configuration
//! to the [`crate::builder::ShellAppBuilder`] pipeline.

mod args;

pub use args::{Action, Args, BuildConfiguration, BuildType, ConfigureArgs, ShellAppArgs};

use crate::builder::ShellAppBuilder;
use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    let shell_args = args.validate()?;

    let builder = ShellAppBuilder::new(shell_args);
    let artifact = builder.run().await?;

    println!("{}", artifact.display());
    Ok(0)
}
