//! Persisted preferences
//!
//! Preferences are a plain value: loaded once at start, passed to the
//! commands that need them, and written back only when the caller asks.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::model::FrameRate;
use crate::error::{TrimcodeError, TrimcodeResult};
use crate::trims::{ScanOrder, TrimSelector};
use crate::utils::logging::LoggingConfig;

/// How the trims line is picked when the command line does not say
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrimPreferences {
    pub order: ScanOrder,
    pub label: Option<String>,
    pub line: Option<usize>,
}

impl TrimPreferences {
    /// Selector described by these preferences; an explicit line wins over
    /// the label.
    pub fn selector(&self) -> TrimSelector {
        match self.line {
            Some(line) => TrimSelector::Line(line),
            None => TrimSelector::Scan {
                order: self.order,
                label: self.label.clone().filter(|label| !label.trim().is_empty()),
            },
        }
    }

    /// Remember the selector used for this run
    pub fn remember(&mut self, selector: &TrimSelector) {
        match selector {
            TrimSelector::Line(line) => self.line = Some(*line),
            TrimSelector::Scan { order, label } => {
                self.line = None;
                self.order = *order;
                self.label = label.clone();
            }
        }
    }
}

/// User preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Rate for frames outside v1 records when the file has no `assume` line
    pub default_fps: FrameRate,
    /// Suffixes tried, in order, to find a timecode next to the script
    pub timecode_suffixes: Vec<String>,
    /// Suffixes tried, in order, to find a chapter file next to the script
    pub chapter_suffixes: Vec<String>,
    pub trims: TrimPreferences,
    pub logging: LoggingConfig,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            default_fps: FrameRate::ntsc_film(),
            timecode_suffixes: [".tc.txt", ".timecode.txt", ".timecodes.txt", ".txt"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            chapter_suffixes: ["_Chapters.xml", ".chapters.xml", ".xml"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            trims: TrimPreferences::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Preferences {
    /// Default preferences file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("trimcode").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("trimcode.toml"))
    }

    /// Parse preferences from TOML
    pub fn from_toml(content: &str) -> TrimcodeResult<Self> {
        toml::from_str(content).map_err(|e| TrimcodeError::Config {
            message: format!("Failed to parse preferences: {}", e),
        })
    }

    /// Serialize preferences to TOML
    pub fn to_toml(&self) -> TrimcodeResult<String> {
        toml::to_string_pretty(self).map_err(|e| TrimcodeError::Config {
            message: format!("Failed to serialize preferences: {}", e),
        })
    }

    /// Load preferences, falling back to defaults when the file is missing
    pub fn load(path: &Path) -> TrimcodeResult<Self> {
        if !path.exists() {
            info!("No preferences at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        info!("Loading preferences from {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Write preferences, creating the parent directory if needed
    pub fn save(&self, path: &Path) -> TrimcodeResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        info!("Saved preferences to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let prefs = Preferences::load(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut prefs = Preferences::default();
        prefs.default_fps = FrameRate::parse("30000/1001").unwrap();
        prefs.trims.remember(&TrimSelector::Scan {
            order: ScanOrder::BottomUp,
            label: Some("tc".to_string()),
        });
        prefs.save(&path).unwrap();

        let loaded = Preferences::load(&path).unwrap();
        assert_eq!(loaded, prefs);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let prefs = Preferences::from_toml("default_fps = \"25\"\n\n[trims]\nline = 3\n").unwrap();
        assert_eq!(prefs.default_fps, FrameRate::new(25.0).unwrap());
        assert_eq!(prefs.trims.selector(), TrimSelector::Line(3));
        assert_eq!(prefs.timecode_suffixes, Preferences::default().timecode_suffixes);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        assert!(matches!(
            Preferences::from_toml("default_fps = \"fast\"\n"),
            Err(TrimcodeError::Config { .. })
        ));
    }

    #[test]
    fn test_blank_label_is_ignored() {
        let prefs = TrimPreferences {
            order: ScanOrder::TopDown,
            label: Some("  ".to_string()),
            line: None,
        };
        assert_eq!(prefs.selector(), TrimSelector::default());
    }
}
