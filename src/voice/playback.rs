//! Audio playback through an external player process

use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use crate::{Config, Error, Result};

/// Player that understands `--target <sink>`
const PIPEWIRE_PLAYER: &str = "pw-play";

/// What happens to the file once playback succeeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterPlayback {
    /// Remove the file (synthesized speech)
    Delete,
    /// Leave the file in place (samples, templates)
    Keep,
}

/// Plays an audio file to completion
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Play `path`, blocking the caller until the player exits
    async fn play(&self, path: &Path, after: AfterPlayback) -> Result<()>;
}

/// Plays audio by running a command-line player (`pw-play`, `afplay`, `mpg123`)
#[derive(Debug, Clone)]
pub struct CommandPlayer {
    binary: String,
    sink: Option<String>,
}

impl CommandPlayer {
    #[must_use]
    pub const fn new(binary: String, sink: Option<String>) -> Self {
        Self { binary, sink }
    }

    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.audio_player.clone(), config.pipewire_sink.clone())
    }

    #[must_use]
    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Arguments passed to the player for `path`
    ///
    /// `--target <sink>` is added only for `pw-play` with a configured sink.
    #[must_use]
    pub fn args(&self, path: &Path) -> Vec<OsString> {
        let mut args = Vec::with_capacity(3);
        if let Some(sink) = &self.sink
            && self.is_sink_aware()
        {
            args.push(OsString::from("--target"));
            args.push(OsString::from(sink));
        }
        args.push(path.as_os_str().to_os_string());
        args
    }

    fn is_sink_aware(&self) -> bool {
        Path::new(&self.binary)
            .file_name()
            .is_some_and(|name| name == PIPEWIRE_PLAYER)
    }
}

#[async_trait]
impl AudioPlayer for CommandPlayer {
    async fn play(&self, path: &Path, after: AfterPlayback) -> Result<()> {
        let args = self.args(path);
        tracing::debug!(player = %self.binary, ?args, "starting playback");

        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| Error::Playback(format!("failed to start {}: {e}", self.binary)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let code = output.status.code().unwrap_or(-1);
            return Err(Error::Playback(format!(
                "{} exited with code {code}: {}",
                self.binary,
                stderr.trim()
            )));
        }

        tracing::debug!(path = %path.display(), "playback complete");

        if after == AfterPlayback::Delete {
            remove_if_present(path).await;
        }

        Ok(())
    }
}

/// Delete a played artifact; an already-missing file is fine
pub(crate) async fn remove_if_present(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "removed audio file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove audio file"),
    }
}
