//! Shell App Builder - white-label iOS shell app configurator.
//!
//! This binary configures an existing shell app archive from a customer
//! manifest (branding, bundle identifier, icons, permissions, JS payload)
//! or builds the generic shell binary with xcodebuild.

mod assets;
mod builder;
mod cli;
mod descriptor;
mod error;
mod manifest;
mod secrets;
mod utils;

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
