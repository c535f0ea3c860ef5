use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "beer-gallery",
    version,
    about = "A terminal gallery for browsing beer check-in photos",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Base URL of the image listing service.
    #[arg(long, env = "GALLERY_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Enable mouse support.
    #[arg(long)]
    pub mouse: Option<bool>,

    /// Minimum card width in terminal columns.
    #[arg(long, value_name = "COLUMNS")]
    pub min_card_width: Option<u16>,

    /// Show beer names under grid cards.
    #[arg(long)]
    pub show_captions: Option<bool>,
}
