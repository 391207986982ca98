use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "terrane", version, about = "Procedural infinite terrain: previews and headless streaming")]
pub struct Cli {
    /// Terrain config (TOML). Built-in defaults apply when omitted.
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a noise map, falloff map or chunk mesh to disk.
    Preview(PreviewArgs),
    /// Walk a viewer through the world and stream chunks around it.
    Stream(StreamArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewMode {
    Noise,
    Falloff,
    Mesh,
}

#[derive(Args, Debug)]
pub struct PreviewArgs {
    #[arg(long, value_enum, default_value_t = PreviewMode::Noise)]
    pub mode: PreviewMode,
    /// Mesh LOD (0 is full detail).
    #[arg(long, default_value_t = 0)]
    pub lod: usize,
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub chunk_x: i32,
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub chunk_y: i32,
    /// PNG for maps, Wavefront OBJ for meshes.
    #[arg(long, short)]
    pub out: PathBuf,
}

#[derive(Args, Debug)]
pub struct StreamArgs {
    #[arg(long, default_value_t = 240)]
    pub ticks: u32,
    /// Viewer travel per tick (world units), along +X.
    #[arg(long, default_value_t = 4.0)]
    pub speed: f32,
    #[arg(long, default_value_t = 16)]
    pub tick_ms: u64,
    /// Worker threads; defaults to the config, then to available cores.
    #[arg(long)]
    pub workers: Option<usize>,
    /// Rebuild the world when the config file changes.
    #[arg(long)]
    pub watch: bool,
}
