//! Shared test utilities

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use talk_mcp::config::TalkConfigFile;
use talk_mcp::voice::{AfterPlayback, AudioPlayer, SpeechSynthesizer, Voice};
use talk_mcp::{Config, Error, McpServer, Result, TalkTools};

/// Bytes the fake synthesizer writes for every request
pub const FAKE_AUDIO: &[u8] = b"ID3fake-mp3-frames";

/// One recorded synthesis request
#[derive(Debug, Clone)]
pub struct SynthCall {
    pub text: String,
    pub voice_id: String,
    pub dest: PathBuf,
}

/// Synthesizer that writes fixed bytes and records each call
#[derive(Default)]
pub struct RecordingSynthesizer {
    pub calls: Mutex<Vec<SynthCall>>,
    pub fail: bool,
}

impl RecordingSynthesizer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<SynthCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for RecordingSynthesizer {
    async fn synthesize(&self, text: &str, voice_id: &str, dest: &Path) -> Result<PathBuf> {
        self.calls.lock().unwrap().push(SynthCall {
            text: text.to_string(),
            voice_id: voice_id.to_string(),
            dest: dest.to_path_buf(),
        });
        if self.fail {
            return Err(Error::Tts("ElevenLabs TTS error 401 Unauthorized".to_string()));
        }
        std::fs::write(dest, FAKE_AUDIO)?;
        Ok(dest.to_path_buf())
    }

    async fn list_voices(&self) -> Result<Vec<Voice>> {
        if self.fail {
            return Err(Error::Tts("quota exceeded".to_string()));
        }
        Ok(vec![
            Voice {
                voice_id: "JBFqnCBsd6RMkjVDRZzb".to_string(),
                name: "George".to_string(),
            },
            Voice {
                voice_id: "v1".to_string(),
                name: "Test Voice".to_string(),
            },
        ])
    }
}

/// One recorded playback
#[derive(Debug, Clone)]
pub struct PlayCall {
    pub path: PathBuf,
    pub after: AfterPlayback,
    /// Whether the file existed when playback started
    pub existed: bool,
}

/// Player that records calls and deletes like the real one
#[derive(Default)]
pub struct RecordingPlayer {
    pub calls: Mutex<Vec<PlayCall>>,
    pub fail: bool,
}

impl RecordingPlayer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<PlayCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioPlayer for RecordingPlayer {
    async fn play(&self, path: &Path, after: AfterPlayback) -> Result<()> {
        self.calls.lock().unwrap().push(PlayCall {
            path: path.to_path_buf(),
            after,
            existed: path.exists(),
        });
        if self.fail {
            return Err(Error::Playback("pw-play exited with code 1".to_string()));
        }
        if after == AfterPlayback::Delete && path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

/// Config pointing at test directories
pub fn test_config(audio_dir: &Path, tmp_dir: &Path) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("AUDIO_FILES_DIR", audio_dir.display().to_string()),
        ("TALK_MCP_TMP_DIR", tmp_dir.display().to_string()),
        ("ELEVENLABS_API_KEY", "test-key".to_string()),
    ]);
    Config::from_sources(|key| vars.get(key).cloned(), &TalkConfigFile::default())
        .expect("test config")
}

/// Tools wired to recording fakes
pub struct Fixture {
    pub audio_dir: tempfile::TempDir,
    pub tmp_dir: tempfile::TempDir,
    pub synthesizer: Arc<RecordingSynthesizer>,
    pub player: Arc<RecordingPlayer>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with(RecordingSynthesizer::default(), RecordingPlayer::default())
    }

    pub fn with(synthesizer: RecordingSynthesizer, player: RecordingPlayer) -> Self {
        Self {
            audio_dir: tempfile::tempdir().expect("audio dir"),
            tmp_dir: tempfile::tempdir().expect("tmp dir"),
            synthesizer: Arc::new(synthesizer),
            player: Arc::new(player),
        }
    }

    pub fn config(&self) -> Config {
        test_config(self.audio_dir.path(), self.tmp_dir.path())
    }

    pub fn tools(&self) -> TalkTools {
        TalkTools::new(
            Arc::new(self.config()),
            self.synthesizer.clone(),
            self.player.clone(),
        )
    }

    pub fn server(&self) -> Arc<McpServer> {
        Arc::new(McpServer::new(self.tools()))
    }

    /// Write a file into the audio directory
    pub fn add_audio(&self, name: &str) -> PathBuf {
        let path = self.audio_dir.path().join(name);
        std::fs::write(&path, b"recorded clip").expect("write audio");
        path
    }

    pub fn write_templates(&self, json: &str) {
        std::fs::write(self.audio_dir.path().join("templates.json"), json).expect("write templates");
    }

    /// Files left in the artifact directory
    pub fn leftover_artifacts(&self) -> Vec<PathBuf> {
        std::fs::read_dir(self.tmp_dir.path())
            .expect("read tmp dir")
            .map(|entry| entry.expect("entry").path())
            .collect()
    }
}
