//! trimcode command-line tool
//!
//! # Usage
//!
//! ```bash
//! trimcode convert --input video.tc.txt --output video.v2.txt
//! trimcode cut --script video.avs --timecode video.tc.txt
//! trimcode trims --script video.avs --label final --json
//! trimcode qpfile --chapters video_Chapters.xml --fps 24000/1001
//! ```

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::info;

use trimcode::cli::{commands, Cli, Commands};
use trimcode::config::Preferences;
use trimcode::utils::logging::{LoggingConfig, LoggingSystem};

/// Main entry point for the trimcode CLI
fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Preferences::default_path);
    let mut prefs = Preferences::load(&config_path)
        .with_context(|| format!("Failed to load preferences from {}", config_path.display()))?;

    // Command-line flags win over the saved logging preferences
    let logging = LoggingConfig {
        level: cli.log_level.unwrap_or(prefs.logging.level),
        format: cli.log_format.unwrap_or(prefs.logging.format),
        target: prefs.logging.target,
    };
    LoggingSystem::new(logging.clone())
        .initialize()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    info!("Preferences: {}", config_path.display());

    match cli.command {
        Commands::Convert(args) => {
            info!("Executing convert command");
            commands::convert(args, &prefs)?;
        }
        Commands::Trims(args) => {
            info!("Executing trims command");
            commands::trims(args, &mut prefs)?;
        }
        Commands::Cut(args) => {
            info!("Executing cut command");
            commands::cut(args, &mut prefs)?;
        }
        Commands::Create(args) => {
            info!("Executing create command");
            commands::create(args, &mut prefs)?;
        }
        Commands::Qpfile(args) => {
            info!("Executing qpfile command");
            commands::qpfile(args, &prefs)?;
        }
        Commands::ChapterTrims(args) => {
            info!("Executing chapter-trims command");
            commands::chapter_trims(args, &prefs)?;
        }
        Commands::Chapters(args) => {
            info!("Executing chapters command");
            commands::chapters(args, &mut prefs)?;
        }
        Commands::Bookmarks(args) => {
            info!("Executing bookmarks command");
            commands::bookmarks(args)?;
        }
    }

    if cli.save_config {
        prefs.logging = logging;
        prefs
            .save(&config_path)
            .with_context(|| format!("Failed to save preferences to {}", config_path.display()))?;
    }

    Ok(())
}
