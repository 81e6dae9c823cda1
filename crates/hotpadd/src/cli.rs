use std::path::PathBuf;

use clap::Parser;

/// Detects a two-button controller combo and reports every press.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Path of the persisted per-device mapping file
    #[arg(short, long, default_value = "controllers.json")]
    pub mappings: PathBuf,

    /// Path of the community mapping database (gamecontrollerdb format)
    #[arg(short, long)]
    pub database: Option<PathBuf>,

    /// Disable rumble feedback on combo press
    #[arg(long)]
    pub no_vibration: bool,

    /// Poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    pub interval_ms: u64,

    /// Keep firing on every tick while the combo is held
    #[arg(long)]
    pub every_tick: bool,

    /// Turn debugging information on
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    pub fn log_level(&self) -> log::LevelFilter {
        if self.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        }
    }
}
