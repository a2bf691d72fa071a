//! Configuration management.
//!
//! - TOML file with one table per concern (paths, logging, encoding, overlay, policy)
//! - Atomic writes (temp file, then rename)
//! - Section-level updates through `toml_edit`
//!
//! # Example
//!
//! ```no_run
//! use splice_core::config::{ConfigManager, ConfigSection};
//!
//! let mut config = ConfigManager::new("reelsplice.toml");
//! config.load_or_create().unwrap();
//!
//! config.settings_mut().encoding.video_codec = "h264_nvenc".to_string();
//! config.update_section(ConfigSection::Encoding).unwrap();
//! ```

mod manager;
mod settings;

pub use manager::{ConfigError, ConfigManager, ConfigResult};
pub use settings::{
    ConfigSection, EncodingSettings, LoggingSettings, OverlaySettings, PathSettings,
    PolicySettings, Settings, DEFAULT_MEDIA_DURATION,
};
