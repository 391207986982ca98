mod cli;
mod config;
mod preview;
mod renderer;
mod stream;
mod watcher;

use std::error::Error;

use clap::Parser;

use crate::cli::{Cli, Command};
use crate::config::{TerrainConfig, load_config};

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => TerrainConfig::default(),
    };

    match &cli.command {
        Command::Preview(args) => {
            let out = preview::run_preview(args, &config)?;
            log::info!("wrote {:?} preview to {}", args.mode, out.display());
        }
        Command::Stream(args) => stream::run_stream(args, cli.config.as_deref(), config)?,
    }
    Ok(())
}
