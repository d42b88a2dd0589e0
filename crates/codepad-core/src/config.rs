//! Editor configuration.
//!
//! ## Learning: Serde for Serialization
//!
//! `#[serde(default)]` on every section fills missing fields from
//! `Default::default()`, so a config file only needs the keys it changes:
//!
//! ```toml
//! [files]
//! auto_save_interval_secs = 30
//!
//! [highlight]
//! string_matching = "greedy"
//! ```

use codepad_syntax::{Color, HighlightSettings};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::keymap::KeyPress;
use crate::view::Font;

/// Shortest and longest accepted auto-save interval, in seconds.
pub const AUTO_SAVE_RANGE: std::ops::RangeInclusive<u64> = 1..=3600;

/// Main editor configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Editor behavior settings
    pub editor: EditorConfig,

    /// Line-number gutter
    pub gutter: GutterConfig,

    /// Highlight rule styles
    pub highlight: HighlightSettings,

    /// File handling settings
    pub files: FileConfig,

    /// External programs
    pub process: ProcessConfig,

    /// UI appearance settings
    pub ui: UiConfig,

    /// Keyboard settings
    pub keyboard: KeyboardConfig,
}

impl Config {
    /// Loads config from the default location, falling back to defaults.
    pub fn load() -> Self {
        match Self::load_from_default_path() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default config: {}", e);
                Self::default()
            }
        }
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("codepad").join("config.toml"))
    }

    /// Saves the config to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::default_path()?)
    }

    /// Saves the config to a file, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Rejects values the editor cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let secs = self.files.auto_save_interval_secs;
        if !AUTO_SAVE_RANGE.contains(&secs) {
            return Err(ConfigError::Invalid(format!(
                "files.auto_save_interval_secs must be between {} and {}, got {}",
                AUTO_SAVE_RANGE.start(),
                AUTO_SAVE_RANGE.end(),
                secs
            )));
        }
        if self.editor.tab_stop == 0 {
            return Err(ConfigError::Invalid("editor.tab_stop must be at least 1".into()));
        }
        if self.process.timeout_secs == 0 {
            return Err(ConfigError::Invalid("process.timeout_secs must be at least 1".into()));
        }
        self.keyboard.check_conflicts()
    }
}

/// Editor behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Columns per tab stop
    pub tab_stop: usize,

    /// Open views read-only
    pub read_only: bool,

    /// Soft-wrap lines at the viewport width
    pub word_wrap: bool,

    /// Background of the current-line emphasis
    pub current_line: Color,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_stop: 4,
            read_only: false,
            word_wrap: true,
            current_line: Color::rgb(0xFF, 0xFF, 0x99),
        }
    }
}

/// Gutter configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GutterConfig {
    /// Pixels added to the digit run
    pub base_margin: f32,
    pub background: Color,
    pub foreground: Color,
}

impl Default for GutterConfig {
    fn default() -> Self {
        Self {
            base_margin: 3.0,
            background: Color::LIGHT_GRAY,
            foreground: Color::BLACK,
        }
    }
}

/// File handling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Seconds between auto-save sweeps
    pub auto_save_interval_secs: u64,
}

impl FileConfig {
    pub fn auto_save_interval(&self) -> Duration {
        Duration::from_secs(self.auto_save_interval_secs)
    }
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            auto_save_interval_secs: 60,
        }
    }
}

/// External program configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessConfig {
    /// Program used to run the current file
    pub interpreter: String,

    /// Version control program
    pub git: String,

    /// Seconds before a child process is killed
    pub timeout_secs: u64,
}

impl ProcessConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            interpreter: "python".to_string(),
            git: "git".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub const ALL: [Theme; 2] = [Theme::Dark, Theme::Light];

    pub fn name(&self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
        }
    }

    /// Matches a theme name, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|theme| theme.name().eq_ignore_ascii_case(name))
    }
}

/// UI appearance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Color theme
    pub theme: Theme,

    /// Font family
    pub font_family: String,

    /// Font size in points
    pub font_size: f32,
}

impl UiConfig {
    pub fn font(&self) -> Font {
        Font {
            family: self.font_family.clone(),
            size: self.font_size,
        }
    }

    pub fn set_font(&mut self, font: &Font) {
        self.font_family = font.family.clone();
        self.font_size = font.size;
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        let font = Font::default();
        Self {
            theme: Theme::default(),
            font_family: font.family,
            font_size: font.size,
        }
    }
}

/// Keyboard configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyboardConfig {
    /// Custom key bindings, `"ctrl+shift+s" = "save_as"`
    pub bindings: HashMap<String, String>,
}

impl KeyboardConfig {
    /// Two spellings of one chord bound to different commands.
    fn check_conflicts(&self) -> Result<(), ConfigError> {
        let mut entries: Vec<_> = self.bindings.iter().collect();
        entries.sort();

        let mut seen: HashMap<KeyPress, (&str, &str)> = HashMap::new();
        for (key_str, cmd_str) in entries {
            let (key_str, cmd_str) = (key_str.as_str(), cmd_str.as_str());
            let Some(key) = KeyPress::parse(key_str) else {
                continue;
            };
            if let Some((other_key, other_cmd)) = seen.insert(key, (key_str, cmd_str)) {
                if other_cmd != cmd_str {
                    return Err(ConfigError::Invalid(format!(
                        "keyboard.bindings: \"{other_key}\" and \"{key_str}\" are the same chord \
                         bound to {other_cmd} and {cmd_str}"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
