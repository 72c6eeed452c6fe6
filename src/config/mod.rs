//! Configuration management for talk-mcp
//!
//! Settings are resolved once at startup with the priority
//! environment variable → config file → built-in default.
//! The result is immutable and shared behind an `Arc`.

pub mod file;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use secrecy::SecretString;

pub use file::{TalkConfigFile, config_file_path, load_config_file};

use crate::{Error, Result};

/// ElevenLabs "George" voice
pub const DEFAULT_VOICE_ID: &str = "JBFqnCBsd6RMkjVDRZzb";

/// Low-latency model; `eleven_multilingual_v2` trades latency for quality
pub const DEFAULT_MODEL_ID: &str = "eleven_turbo_v2_5";

pub const DEFAULT_OUTPUT_FORMAT: &str = "mp3_44100_128";

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io";

pub const DEFAULT_AUDIO_PLAYER: &str = "pw-play";

pub const DEFAULT_HOST: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 8000;

/// Directory name for bundled audio, resolved next to the executable
const SAMPLE_AUDIO_DIR: &str = "sample-audio";

/// Transport the MCP server listens on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout
    #[default]
    Stdio,
    /// JSON-RPC over HTTP POST
    Http,
}

impl FromStr for Transport {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "http" | "streamable-http" => Ok(Self::Http),
            other => Err(Error::Config(format!(
                "unknown transport {other:?} (expected \"stdio\" or \"http\")"
            ))),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio => f.write_str("stdio"),
            Self::Http => f.write_str("http"),
        }
    }
}

/// Process-wide settings
#[derive(Debug)]
pub struct Config {
    /// ElevenLabs API key; absence is reported on first synthesis
    pub api_key: Option<SecretString>,

    /// ElevenLabs API base URL
    pub api_base_url: String,

    /// Voice used by new sessions
    pub default_voice_id: String,

    /// TTS model identifier
    pub model_id: String,

    /// Encoded output format requested from the API (e.g. `mp3_44100_128`)
    pub output_format: String,

    /// Directory that receives synthesized speech before playback
    pub tmp_dir: PathBuf,

    /// Player binary (`pw-play`, `afplay`, `mpg123`, ...)
    pub audio_player: String,

    /// PipeWire sink name; `None` means the system default
    pub pipewire_sink: Option<String>,

    /// Directory holding samples and `templates.json`
    pub audio_files_dir: PathBuf,

    pub transport: Transport,

    pub host: String,

    pub port: u16,
}

impl Config {
    /// Load configuration from the process environment and the config file
    ///
    /// # Errors
    ///
    /// Returns error if the transport or port values cannot be parsed
    pub fn load() -> Result<Self> {
        let file = load_config_file();
        Self::from_sources(|key| std::env::var(key).ok(), &file)
    }

    /// Build configuration from an arbitrary variable lookup and file overlay
    ///
    /// # Errors
    ///
    /// Returns error if the transport or port values cannot be parsed
    pub fn from_sources<F>(lookup: F, file: &TalkConfigFile) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values behave like unset ones
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = var("ELEVENLABS_API_KEY")
            .or_else(|| file.elevenlabs.api_key.clone())
            .map(SecretString::from);

        let api_base_url = var("ELEVENLABS_BASE_URL")
            .or_else(|| file.elevenlabs.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let default_voice_id = var("ELEVENLABS_VOICE_ID")
            .or_else(|| file.elevenlabs.voice_id.clone())
            .unwrap_or_else(|| DEFAULT_VOICE_ID.to_string());

        let model_id = var("ELEVENLABS_MODEL_ID")
            .or_else(|| file.elevenlabs.model_id.clone())
            .unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());

        let output_format = var("ELEVENLABS_OUTPUT_FORMAT")
            .or_else(|| file.elevenlabs.output_format.clone())
            .unwrap_or_else(|| DEFAULT_OUTPUT_FORMAT.to_string());

        let tmp_dir = var("TALK_MCP_TMP_DIR")
            .or_else(|| file.audio.tmp_dir.clone())
            .map_or_else(std::env::temp_dir, PathBuf::from);

        let audio_player = var("AUDIO_PLAYER")
            .or_else(|| file.audio.player.clone())
            .unwrap_or_else(|| DEFAULT_AUDIO_PLAYER.to_string());

        let pipewire_sink = var("PIPEWIRE_SINK").or_else(|| file.audio.pipewire_sink.clone());

        let audio_files_dir = var("AUDIO_FILES_DIR")
            .or_else(|| file.audio.files_dir.clone())
            .map_or_else(default_audio_files_dir, PathBuf::from);

        let transport = match var("MCP_TRANSPORT").or_else(|| file.server.transport.clone()) {
            Some(value) => value.parse()?,
            None => Transport::default(),
        };

        let host = var("MCP_HOST")
            .or_else(|| file.server.host.clone())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match var("MCP_PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|e| Error::Config(format!("invalid MCP_PORT {value:?}: {e}")))?,
            None => file.server.port.unwrap_or(DEFAULT_PORT),
        };

        Ok(Self {
            api_key,
            api_base_url,
            default_voice_id,
            model_id,
            output_format,
            tmp_dir,
            audio_player,
            pipewire_sink,
            audio_files_dir,
            transport,
            host,
            port,
        })
    }

    /// Path of `templates.json` inside the audio files directory
    #[must_use]
    pub fn templates_path(&self) -> PathBuf {
        self.audio_files_dir.join("templates.json")
    }

    /// File extension matching the configured output format
    ///
    /// `mp3_44100_128` → `mp3`, `pcm_16000` → `pcm`
    #[must_use]
    pub fn audio_extension(&self) -> &str {
        self.output_format
            .split('_')
            .next()
            .filter(|codec| !codec.is_empty())
            .unwrap_or("mp3")
    }

    /// Fresh artifact path for one synthesis call
    #[must_use]
    pub fn speech_artifact_path(&self) -> PathBuf {
        self.tmp_dir.join(format!(
            "talk_mcp_speech-{}.{}",
            uuid::Uuid::new_v4().simple(),
            self.audio_extension()
        ))
    }

    /// Socket address string for the HTTP transport
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `sample-audio` next to the installed executable, or relative to the cwd
fn default_audio_files_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .as_deref()
        .and_then(Path::parent)
        .map_or_else(|| PathBuf::from(SAMPLE_AUDIO_DIR), |dir| dir.join(SAMPLE_AUDIO_DIR))
}
