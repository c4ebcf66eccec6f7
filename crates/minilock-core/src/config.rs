//! Lock configuration
//!
//! Read from `$XDG_CONFIG_HOME/minilock/config.toml` once privileges have
//! been dropped. Every field has a default, and a broken file never keeps
//! the screen from locking: it is reported and ignored.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::layout::Size;
use crate::retry::RetryPolicy;

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration directory under ~/.config
const CONFIG_DIR_NAME: &str = "minilock";

/// User-tunable settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockConfig {
    /// Keyboard grab attempts before giving up
    pub grab_attempts: u32,

    /// Milliseconds between grab attempts
    pub grab_delay_ms: u64,

    /// Dialog panel width in pixels
    pub panel_width: u16,

    /// Dialog panel height in pixels
    pub panel_height: u16,

    /// Core X font used for the dialog text
    pub font: String,

    pub palette: Palette,

    /// Program and arguments run for Ctrl+S
    pub suspend_command: Vec<String>,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            grab_attempts: 1000,
            grab_delay_ms: 1,
            panel_width: 300,
            panel_height: 150,
            font: "fixed".to_string(),
            palette: Palette::default(),
            suspend_command: vec!["systemctl".to_string(), "suspend".to_string()],
        }
    }
}

impl LockConfig {
    /// Get the configuration directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(CONFIG_DIR_NAME))
    }

    /// Get the full config file path
    pub fn config_file_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Load the user's configuration, or defaults if there is none
    pub fn load() -> Self {
        match Self::config_file_path() {
            Some(path) => Self::load_or_default(&path),
            None => Self::default(),
        }
    }

    /// Load from `path`, falling back to defaults on any problem
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(config) => {
                tracing::debug!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::warn!("Ignoring config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Strictly load from `path`
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config: Self =
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.panel_width == 0 || self.panel_height == 0 {
            return Err(ConfigError::Invalid("panel size must be non-zero".into()));
        }
        if self.suspend_command.is_empty() {
            return Err(ConfigError::Invalid("suspend_command must name a program".into()));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.grab_attempts, Duration::from_millis(self.grab_delay_ms))
    }

    pub fn panel_size(&self) -> Size {
        Size::new(self.panel_width, self.panel_height)
    }
}

/// Dialog colors (solarized light by default)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Full-screen window background
    pub background: Rgb,
    /// Dialog panel fill
    pub panel: Rgb,
    /// Labels, user name and mask
    pub text: Rgb,
    /// Failure banner
    pub failure: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgb(0xfd, 0xf6, 0xe3), // base3
            panel: Rgb(0xee, 0xe8, 0xd5),      // base2
            text: Rgb(0x65, 0x7b, 0x83),       // base00
            failure: Rgb(0xdc, 0x32, 0x2f),    // red
        }
    }
}

/// 24-bit color written as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Channels scaled to the 16-bit range X uses
    pub fn to_u16(self) -> (u16, u16, u16) {
        let scale = |c: u8| u16::from(c) * 0x101;
        (scale(self.0), scale(self.1), scale(self.2))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::str::FromStr for Rgb {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| ConfigError::Invalid(format!("color {:?} is not #rrggbb", s)))?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| ConfigError::Invalid(format!("color {:?}: {}", s, e)))
        };
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl From<Rgb> for String {
    fn from(rgb: Rgb) -> Self {
        rgb.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid value: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = LockConfig::default();
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.panel_size(), Size::new(300, 150));
        assert_eq!(config.suspend_command, vec!["systemctl", "suspend"]);
        assert_eq!(config.palette.failure, Rgb(0xdc, 0x32, 0x2f));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "grab_attempts = 50\n\n[palette]\nfailure = \"#ff0000\"\n",
        )
        .unwrap();

        let config = LockConfig::load_from(&path).unwrap();
        assert_eq!(config.grab_attempts, 50);
        assert_eq!(config.grab_delay_ms, 1);
        assert_eq!(config.palette.failure, Rgb(0xff, 0, 0));
        assert_eq!(config.palette.panel, Palette::default().panel);
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[palette]\ntext = \"blue\"\n").unwrap();

        assert!(LockConfig::load_from(&path).is_err());
        assert_eq!(LockConfig::load_or_default(&path), LockConfig::default());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert_eq!(LockConfig::load_or_default(&path), LockConfig::default());
    }

    #[test]
    fn test_rejects_empty_suspend_command() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "suspend_command = []\n").unwrap();

        assert!(matches!(
            LockConfig::load_from(&path),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rgb_round_trip_and_scaling() {
        let rgb: Rgb = "#657b83".parse().unwrap();
        assert_eq!(rgb, Rgb(0x65, 0x7b, 0x83));
        assert_eq!(rgb.to_string(), "#657b83");
        assert_eq!(Rgb(0xff, 0x00, 0x80).to_u16(), (0xffff, 0x0000, 0x8080));
        assert!("657b83".parse::<Rgb>().is_err());
        assert!("#65zb83".parse::<Rgb>().is_err());
    }
}
