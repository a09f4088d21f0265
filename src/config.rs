use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path of the task storage file. Empty means the platform data
    /// directory for the active profile.
    #[serde(default)]
    pub storage_path: String,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default = "default_current_theme")]
    pub current_theme: String,
    #[serde(default)]
    pub themes: HashMap<String, Theme>,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_add")]
    pub add: String,
    #[serde(default = "default_toggle_completed")]
    pub toggle_completed: String,
    #[serde(default = "default_delete")]
    pub delete: String,
    #[serde(default = "default_list_up")]
    pub list_up: String,
    #[serde(default = "default_list_down")]
    pub list_down: String,
    #[serde(default = "default_help")]
    pub help: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    #[serde(default = "default_highlight_fg")]
    pub highlight_fg: String,
    #[serde(default = "default_overdue_fg")]
    pub overdue_fg: String,
    #[serde(default = "default_today_fg")]
    pub today_fg: String,
    #[serde(default = "default_completed_fg")]
    pub completed_fg: String,
}

impl Default for Config {
    fn default() -> Self {
        let mut themes = HashMap::new();

        // Add example custom theme for users to see how to define themes
        themes.insert(
            "lightblue".to_string(),
            Theme {
                fg: "cyan".to_string(),
                bg: "black".to_string(),
                highlight_bg: "blue".to_string(),
                highlight_fg: "white".to_string(),
                overdue_fg: "lightred".to_string(),
                today_fg: "lightyellow".to_string(),
                completed_fg: "darkgray".to_string(),
            },
        );

        Self {
            storage_path: String::new(),
            key_bindings: KeyBindings::default(),
            current_theme: default_current_theme(),
            themes,
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            add: default_add(),
            toggle_completed: default_toggle_completed(),
            delete: default_delete(),
            list_up: default_list_up(),
            list_down: default_list_down(),
            help: default_help(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            highlight_bg: default_highlight_bg(),
            highlight_fg: default_highlight_fg(),
            overdue_fg: default_overdue_fg(),
            today_fg: default_today_fg(),
            completed_fg: default_completed_fg(),
        }
    }
}

impl Theme {
    /// Get preset themes that are always available
    pub fn get_preset_themes() -> HashMap<String, Theme> {
        let mut themes = HashMap::new();

        themes.insert(
            "default".to_string(),
            Theme {
                fg: "white".to_string(),
                bg: "black".to_string(),
                highlight_bg: "blue".to_string(),
                highlight_fg: "white".to_string(),
                overdue_fg: "red".to_string(),
                today_fg: "yellow".to_string(),
                completed_fg: "darkgray".to_string(),
            },
        );

        themes.insert(
            "dark".to_string(),
            Theme {
                fg: "white".to_string(),
                bg: "black".to_string(),
                highlight_bg: "cyan".to_string(),
                highlight_fg: "black".to_string(),
                overdue_fg: "lightred".to_string(),
                today_fg: "lightyellow".to_string(),
                completed_fg: "darkgray".to_string(),
            },
        );

        themes.insert(
            "light".to_string(),
            Theme {
                fg: "black".to_string(),
                bg: "white".to_string(),
                highlight_bg: "blue".to_string(),
                highlight_fg: "white".to_string(),
                overdue_fg: "red".to_string(),
                today_fg: "magenta".to_string(),
                completed_fg: "gray".to_string(),
            },
        );

        themes.insert(
            "green".to_string(),
            Theme {
                fg: "green".to_string(),
                bg: "black".to_string(),
                highlight_bg: "yellow".to_string(),
                highlight_fg: "black".to_string(),
                overdue_fg: "lightred".to_string(),
                today_fg: "lightyellow".to_string(),
                completed_fg: "darkgray".to_string(),
            },
        );

        themes.insert(
            "monochrome".to_string(),
            Theme {
                fg: "white".to_string(),
                bg: "black".to_string(),
                highlight_bg: "white".to_string(),
                highlight_fg: "black".to_string(),
                overdue_fg: "white".to_string(),
                today_fg: "gray".to_string(),
                completed_fg: "darkgray".to_string(),
            },
        );

        themes
    }
}

// Default value functions
fn default_quit() -> String {
    "q".to_string()
}

fn default_add() -> String {
    "a".to_string()
}

fn default_toggle_completed() -> String {
    "Space".to_string()
}

fn default_delete() -> String {
    "d".to_string()
}

fn default_list_up() -> String {
    "k".to_string()
}

fn default_list_down() -> String {
    "j".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_current_theme() -> String {
    "default".to_string()
}

fn default_fg() -> String {
    "white".to_string()
}

fn default_bg() -> String {
    "black".to_string()
}

fn default_highlight_bg() -> String {
    "blue".to_string()
}

fn default_highlight_fg() -> String {
    "white".to_string()
}

fn default_overdue_fg() -> String {
    "red".to_string()
}

fn default_today_fg() -> String {
    "yellow".to_string()
}

fn default_completed_fg() -> String {
    "darkgray".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
}

impl Config {
    /// Load configuration from file, or create default if missing
    /// Uses the provided profile to determine the config path
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;

        if config_path.exists() {
            let contents = fs::read_to_string(&config_path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            // Create default config and save it
            let mut config = Config::default();
            let save_result = config.save_with_profile(profile);
            if let Err(ref e) = save_result {
                eprintln!("ERROR: Failed to save config file: {}", e);
                eprintln!("Config path: {:?}", config_path);
            }
            save_result?;
            Ok(config)
        }
    }

    /// Load configuration from file, using production profile
    /// Use load_with_profile() to specify a different profile
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_profile(utils::Profile::Prod)
    }

    /// Load configuration from an explicit file path (--config flag)
    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        let config_path = utils::expand_path(path);
        let contents = fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", config_path.display(), e)))?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_with_profile(&mut self, profile: utils::Profile) -> Result<(), ConfigError> {
        // Ensure config version is set before saving
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        let config_path = Self::get_config_path(profile)?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, toml_string)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile).ok_or_else(|| {
            ConfigError::ConfigDirError("Could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get the expanded storage file path for the given profile. An empty
    /// configured path resolves to the profile's platform data directory so
    /// dev and prod never share data.
    pub fn get_storage_path(&self, profile: utils::Profile) -> PathBuf {
        if self.storage_path.is_empty() {
            Self::default_storage_path_for_profile(profile)
        } else {
            utils::expand_path(&self.storage_path)
        }
    }

    fn default_storage_path_for_profile(profile: utils::Profile) -> PathBuf {
        if let Some(data_dir) = utils::get_data_dir(profile) {
            data_dir.join("tasks.json")
        } else {
            // Fallback paths - platform-specific
            #[cfg(target_os = "macos")]
            let fallback = match profile {
                utils::Profile::Dev => "~/Library/Application Support/duetask-dev/tasks.json",
                utils::Profile::Prod => "~/Library/Application Support/duetask/tasks.json",
            };
            #[cfg(not(target_os = "macos"))]
            let fallback = match profile {
                utils::Profile::Dev => "~/.local/share/duetask-dev/tasks.json",
                utils::Profile::Prod => "~/.local/share/duetask/tasks.json",
            };
            utils::expand_path(fallback)
        }
    }

    /// Get the currently active theme
    /// If highlight_fg is not set (empty string), it is calculated from highlight_bg
    pub fn get_active_theme(&self) -> Theme {
        use crate::tui::widgets::color::{
            format_color_for_display, get_contrast_text_color, parse_color,
        };

        let mut theme = if let Some(theme) = self.themes.get(&self.current_theme) {
            theme.clone()
        } else if let Some(theme) = Theme::get_preset_themes().get(&self.current_theme) {
            theme.clone()
        } else {
            // Final fallback: default theme
            Theme::get_preset_themes()
                .get("default")
                .cloned()
                .unwrap_or_default()
        };

        if theme.highlight_fg.is_empty() {
            let highlight_bg_color = parse_color(&theme.highlight_bg);
            let calculated_fg = get_contrast_text_color(highlight_bg_color);
            theme.highlight_fg = format_color_for_display(&calculated_fg);
        }

        theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.key_bindings.quit, "q");
        assert_eq!(config.key_bindings.toggle_completed, "Space");
        assert_eq!(config.current_theme, "default");
        assert!(config.storage_path.is_empty());
    }

    #[test]
    fn partial_key_bindings_keep_remaining_defaults() {
        let config: Config = toml::from_str("[key_bindings]\nquit = \"x\"\n").unwrap();
        assert_eq!(config.key_bindings.quit, "x");
        assert_eq!(config.key_bindings.add, "a");
        assert_eq!(config.key_bindings.help, "F1");
    }

    #[test]
    fn unknown_theme_name_falls_back_to_default_preset() {
        let mut config = Config::default();
        config.current_theme = "no-such-theme".to_string();
        let theme = config.get_active_theme();
        assert_eq!(theme.overdue_fg, "red");
        assert_eq!(theme.today_fg, "yellow");
    }

    #[test]
    fn user_defined_theme_wins_over_presets() {
        let mut config = Config::default();
        config.themes.insert(
            "custom".to_string(),
            Theme {
                overdue_fg: "#ff00ff".to_string(),
                ..Theme::default()
            },
        );
        config.current_theme = "custom".to_string();
        assert_eq!(config.get_active_theme().overdue_fg, "#ff00ff");
    }

    #[test]
    fn empty_highlight_fg_is_filled_from_contrast() {
        let mut config = Config::default();
        config.themes.insert(
            "contrast".to_string(),
            Theme {
                highlight_fg: String::new(),
                ..Theme::default()
            },
        );
        config.current_theme = "contrast".to_string();
        assert!(!config.get_active_theme().highlight_fg.is_empty());
    }

    #[test]
    fn custom_storage_path_is_expanded_and_kept() {
        let mut config = Config::default();
        config.storage_path = "/tmp/custom-tasks.json".to_string();
        assert_eq!(
            config.get_storage_path(utils::Profile::Prod),
            PathBuf::from("/tmp/custom-tasks.json")
        );
    }

    #[test]
    fn empty_storage_path_resolves_to_tasks_file() {
        let config = Config::default();
        let path = config.get_storage_path(utils::Profile::Prod);
        assert!(path.ends_with("tasks.json"));
    }

    #[test]
    fn config_round_trips_through_toml() {
        let mut config = Config::default();
        config.storage_path = "~/tasks/mine.json".to_string();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.storage_path, config.storage_path);
        assert_eq!(parsed.key_bindings.delete, config.key_bindings.delete);
    }
}
