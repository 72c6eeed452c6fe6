//! The voice operations behind each tool

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::ToolOutcome;
use crate::prompt::SPOKEN_KEYPOINTS_PROMPT;
use crate::session::Session;
use crate::templates::{TemplateRegistry, is_bare_file_name};
use crate::voice::{
    AfterPlayback, AudioPlayer, CommandPlayer, ElevenLabsTts, SpeechSynthesizer,
    remove_if_present,
};
use crate::{Config, Error, Result};

/// Speech, sample and template operations
///
/// Stateless apart from the [`Session`] passed into each call.
pub struct TalkTools {
    config: Arc<Config>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    player: Arc<dyn AudioPlayer>,
    templates: TemplateRegistry,
}

impl TalkTools {
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        player: Arc<dyn AudioPlayer>,
    ) -> Self {
        let templates = TemplateRegistry::new(&config.audio_files_dir);
        Self {
            config,
            synthesizer,
            player,
            templates,
        }
    }

    /// Tools backed by ElevenLabs and the configured player binary
    #[must_use]
    pub fn from_config(config: Arc<Config>) -> Self {
        let synthesizer = Arc::new(ElevenLabsTts::from_config(&config));
        let player = Arc::new(CommandPlayer::from_config(&config));
        Self::new(config, synthesizer, player)
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Speak distilled keypoints with the session voice
    ///
    /// # Errors
    ///
    /// Returns error if `text` is blank, synthesis fails, or the player fails
    pub async fn speak(&self, session: &Session, text: &str) -> Result<ToolOutcome> {
        self.say(session, text).await
    }

    /// Speak `text` verbatim with the session voice
    ///
    /// Identical to [`Self::speak`]; distillation is the caller's convention.
    ///
    /// # Errors
    ///
    /// Returns error if `text` is blank, synthesis fails, or the player fails
    pub async fn speak_raw(&self, session: &Session, text: &str) -> Result<ToolOutcome> {
        self.say(session, text).await
    }

    async fn say(&self, session: &Session, text: &str) -> Result<ToolOutcome> {
        if text.trim().is_empty() {
            return Err(Error::InvalidArgument("text must not be empty".to_string()));
        }

        let voice_id = session.voice_id().await;
        let dest = self.config.speech_artifact_path();

        let path = self.synthesizer.synthesize(text, &voice_id, &dest).await?;

        if let Err(e) = self.player.play(&path, AfterPlayback::Delete).await {
            remove_if_present(&path).await;
            return Err(e);
        }

        tracing::info!(session = %session.id(), voice = %voice_id, "spoke text");
        Ok(ToolOutcome::completed("Spoken."))
    }

    /// Change the voice for the rest of the session
    pub async fn set_voice(&self, session: &Session, voice_id: &str) -> ToolOutcome {
        session.set_voice_id(voice_id).await;
        tracing::info!(session = %session.id(), voice = voice_id, "voice changed");
        ToolOutcome::completed(format!("Voice set to {voice_id}."))
    }

    /// Voice catalog as pretty-printed JSON
    ///
    /// # Errors
    ///
    /// Returns error if the speech API request fails
    pub async fn list_voices(&self) -> Result<ToolOutcome> {
        let voices = self.synthesizer.list_voices().await?;
        Ok(ToolOutcome::completed(serde_json::to_string_pretty(&voices)?))
    }

    /// Sorted, non-hidden entries of the audio files directory
    ///
    /// # Errors
    ///
    /// Returns error if the directory exists but cannot be read
    pub async fn list_samples(&self) -> Result<ToolOutcome> {
        let dir = &self.config.audio_files_dir;
        if !is_dir(dir).await {
            return Ok(ToolOutcome::not_found(format!(
                "Audio files directory not found: {}",
                dir.display()
            )));
        }

        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with('.') {
                files.push(name);
            }
        }

        if files.is_empty() {
            return Ok(ToolOutcome::completed("No audio files found."));
        }

        files.sort();
        Ok(ToolOutcome::completed(files.join("\n")))
    }

    /// Play a file from the audio files directory, keeping it
    ///
    /// # Errors
    ///
    /// Returns error if the player fails
    pub async fn play_sample(&self, filename: &str) -> Result<ToolOutcome> {
        let Some(path) = self.sample_path(filename).await else {
            return Ok(ToolOutcome::not_found(format!("File not found: {filename}")));
        };

        self.player.play(&path, AfterPlayback::Keep).await?;
        tracing::info!(sample = filename, "played sample");
        Ok(ToolOutcome::completed(format!("Played {filename}.")))
    }

    /// One `name: description` line per template
    ///
    /// # Errors
    ///
    /// Returns error if `templates.json` is malformed
    pub async fn list_templates(&self) -> Result<ToolOutcome> {
        let templates = self.templates.load().await?;
        if templates.is_empty() {
            return Ok(ToolOutcome::completed("No templates configured."));
        }

        let lines: Vec<String> = templates
            .iter()
            .map(|(name, template)| format!("{name}: {}", template.description))
            .collect();
        Ok(ToolOutcome::completed(lines.join("\n")))
    }

    /// Play a template's clip by name, keeping the file
    ///
    /// # Errors
    ///
    /// Returns error if `templates.json` is malformed or the player fails
    pub async fn play_template(&self, name: &str) -> Result<ToolOutcome> {
        let templates = self.templates.load().await?;
        let Some(template) = templates.get(name) else {
            return Ok(ToolOutcome::not_found(format!(
                "Template not found: {name}. Use list_templates() to see available options."
            )));
        };

        let path = self.templates.audio_path(template);
        if !is_file(&path).await {
            return Ok(ToolOutcome::not_found(format!(
                "Audio file missing: {}",
                template.file
            )));
        }

        self.player.play(&path, AfterPlayback::Keep).await?;
        tracing::info!(template = name, "played template");
        Ok(ToolOutcome::completed(format!("Played template: {name}.")))
    }

    /// Instructions for condensing a reply into spoken keypoints
    #[must_use]
    #[allow(clippy::unused_self)]
    pub const fn spoken_keypoints_prompt(&self) -> &'static str {
        SPOKEN_KEYPOINTS_PROMPT
    }

    /// Resolve a sample name to an existing file inside the audio directory
    async fn sample_path(&self, filename: &str) -> Option<PathBuf> {
        if !is_bare_file_name(filename) {
            return None;
        }
        let path = self.config.audio_files_dir.join(filename);
        is_file(&path).await.then_some(path)
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file())
}
