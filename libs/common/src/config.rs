//! Configuration module for the publish intake
//!
//! Values are layered: built-in defaults, then an optional
//! `publish-intake.toml` file, then `PUBLISH_INTAKE_*` environment variables.

use crate::error::{ConfigError, ConfigResult};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Characters that may not appear in a claim name, as one character class.
///
/// Mirrors the URI validator's notion of an invalid character: reserved URI
/// punctuation, whitespace, ASCII control characters and the two Unicode
/// non-characters.
pub const DEFAULT_INVALID_URI_PATTERN: &str =
    r#"[ =&#:$@%?;/\\"<>\{\}|^~\[\]`\x{0000}-\x{0020}\x{FFFE}\x{FFFF}]"#;

/// Environment prefix for overrides, e.g. `PUBLISH_INTAKE_FFPROBE_PATH`
pub const ENV_PREFIX: &str = "PUBLISH_INTAKE";

/// Intake configuration struct
#[derive(Debug, Clone, Deserialize)]
pub struct IntakeConfig {
    /// Executable used to read video metadata
    pub ffprobe_path: String,
    /// Executable whose presence enables the optimize option
    pub ffmpeg_path: String,
    /// JSON file holding persisted UI preferences
    pub preferences_path: PathBuf,
    /// Regular expression matching characters not allowed in a claim name
    pub invalid_uri_pattern: String,
    /// Whether fire-and-forget events are emitted
    pub analytics_enabled: bool,
    /// Whether the form edits an existing claim
    pub still_editing: bool,
}

impl IntakeConfig {
    /// Create a new IntakeConfig from `publish-intake.toml` (if present) and
    /// environment variables
    ///
    /// # Environment Variables
    /// - `PUBLISH_INTAKE_FFPROBE_PATH` (default: "ffprobe")
    /// - `PUBLISH_INTAKE_FFMPEG_PATH` (default: "ffmpeg")
    /// - `PUBLISH_INTAKE_PREFERENCES_PATH` (default: "publish-intake-preferences.json")
    /// - `PUBLISH_INTAKE_INVALID_URI_PATTERN` (default: [`DEFAULT_INVALID_URI_PATTERN`])
    /// - `PUBLISH_INTAKE_ANALYTICS_ENABLED` (default: true)
    /// - `PUBLISH_INTAKE_STILL_EDITING` (default: false)
    pub fn from_env() -> ConfigResult<Self> {
        Self::load(Path::new("publish-intake"), false)
    }

    /// Load configuration from an explicit file, then apply environment overrides
    pub fn load(file: &Path, required: bool) -> ConfigResult<Self> {
        let file_name = file.to_string_lossy();

        let settings = Config::builder()
            .set_default("ffprobe_path", "ffprobe")?
            .set_default("ffmpeg_path", "ffmpeg")?
            .set_default("preferences_path", "publish-intake-preferences.json")?
            .set_default("invalid_uri_pattern", DEFAULT_INVALID_URI_PATTERN)?
            .set_default("analytics_enabled", true)?
            .set_default("still_editing", false)?
            .add_source(File::with_name(&file_name).required(required))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let config: IntakeConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.ffprobe_path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "ffprobe_path".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if self.ffmpeg_path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "ffmpeg_path".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if self.invalid_uri_pattern.is_empty() {
            return Err(ConfigError::Invalid {
                key: "invalid_uri_pattern".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
