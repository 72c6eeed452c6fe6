//! TOML configuration file loading
//!
//! Supports `~/.config/talk-mcp/config.toml` (or `$TALK_MCP_CONFIG`) as a
//! persistent config source. All fields are optional; the file is a partial
//! overlay underneath environment variables.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct TalkConfigFile {
    /// Speech API configuration
    #[serde(default)]
    pub elevenlabs: ElevenLabsFileConfig,

    /// Playback and audio file locations
    #[serde(default)]
    pub audio: AudioFileConfig,

    /// MCP transport configuration
    #[serde(default)]
    pub server: ServerFileConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct ElevenLabsFileConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub voice_id: Option<String>,
    pub model_id: Option<String>,
    pub output_format: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AudioFileConfig {
    /// Player binary (e.g. "pw-play", "afplay", "mpg123")
    pub player: Option<String>,

    /// PipeWire sink passed as `--target` to `pw-play`
    pub pipewire_sink: Option<String>,

    /// Directory with samples and `templates.json`
    pub files_dir: Option<String>,

    /// Directory for synthesized speech artifacts
    pub tmp_dir: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// "stdio" or "http"
    pub transport: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Load the TOML config file from the standard path
///
/// Returns `TalkConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> TalkConfigFile {
    let Some(path) = config_file_path() else {
        return TalkConfigFile::default();
    };

    if !path.exists() {
        return TalkConfigFile::default();
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded config file");
                config
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to parse config file, using defaults"
                );
                TalkConfigFile::default()
            }
        },
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to read config file"
            );
            TalkConfigFile::default()
        }
    }
}

/// Return the config file path: `$TALK_MCP_CONFIG` or `~/.config/talk-mcp/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("TALK_MCP_CONFIG").filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }

    directories::BaseDirs::new().map(|d| d.config_dir().join("talk-mcp").join("config.toml"))
}
