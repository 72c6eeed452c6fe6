//! Text-to-speech (TTS) processing

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::{Config, Error, Result};

/// A voice offered by the speech API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub voice_id: String,
    pub name: String,
}

/// Turns text into an audio file
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` with `voice_id` into `dest`, truncating it
    ///
    /// Returns the path of the written audio file.
    async fn synthesize(&self, text: &str, voice_id: &str, dest: &Path) -> Result<PathBuf>;

    /// Fetch the full voice catalog
    async fn list_voices(&self) -> Result<Vec<Voice>>;
}

/// Synthesizes speech through the ElevenLabs REST API
pub struct ElevenLabsTts {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
    output_format: String,
}

impl ElevenLabsTts {
    /// Create a TTS client from loaded configuration
    ///
    /// A missing API key is accepted here and reported on first use.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config
                .api_key
                .as_ref()
                .map(|key| SecretString::from(key.expose_secret().to_owned())),
            base_url: config.api_base_url.clone(),
            model: config.model_id.clone(),
            output_format: config.output_format.clone(),
        }
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_ref()
            .map(|key| key.expose_secret())
            .ok_or_else(|| Error::Tts("ELEVENLABS_API_KEY is not set".to_string()))
    }

    /// POST the synthesis request and stream the body into `dest`
    async fn stream_to_file(&self, text: &str, voice_id: &str, dest: &Path) -> Result<u64> {
        #[derive(Serialize)]
        struct ElevenLabsRequest<'a> {
            text: &'a str,
            model_id: &'a str,
        }

        let api_key = self.api_key()?;
        let url = format!("{}/v1/text-to-speech/{voice_id}", self.base_url);

        let response = self
            .client
            .post(&url)
            .query(&[("output_format", self.output_format.as_str())])
            .header("xi-api-key", api_key)
            .json(&ElevenLabsRequest {
                text,
                model_id: &self.model,
            })
            .send()
            .await
            .map_err(|e| Error::Tts(format!("request to ElevenLabs failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("ElevenLabs TTS error {status}: {body}")));
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::Tts(format!("audio stream interrupted: {e}")))?;
            if chunk.is_empty() {
                continue;
            }
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        Ok(written)
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsTts {
    async fn synthesize(&self, text: &str, voice_id: &str, dest: &Path) -> Result<PathBuf> {
        tracing::debug!(
            voice = voice_id,
            model = %self.model,
            chars = text.len(),
            "synthesizing speech"
        );

        match self.stream_to_file(text, voice_id, dest).await {
            Ok(bytes) => {
                tracing::debug!(path = %dest.display(), bytes, "speech written");
                Ok(dest.to_path_buf())
            }
            Err(e) => {
                // Never leave a truncated artifact behind
                if let Err(rm) = tokio::fs::remove_file(dest).await
                    && rm.kind() != std::io::ErrorKind::NotFound
                {
                    tracing::warn!(path = %dest.display(), error = %rm, "failed to remove partial audio");
                }
                Err(match e {
                    Error::Io(io) => Error::Tts(format!("failed to write audio: {io}")),
                    other => other,
                })
            }
        }
    }

    async fn list_voices(&self) -> Result<Vec<Voice>> {
        #[derive(Deserialize)]
        struct VoicesResponse {
            voices: Vec<Voice>,
        }

        let api_key = self.api_key()?;
        let url = format!("{}/v1/voices", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("xi-api-key", api_key)
            .send()
            .await
            .map_err(|e| Error::Tts(format!("request to ElevenLabs failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Tts(format!("ElevenLabs voices error {status}: {body}")));
        }

        let body: VoicesResponse = response
            .json()
            .await
            .map_err(|e| Error::Tts(format!("invalid voices response: {e}")))?;

        tracing::debug!(count = body.voices.len(), "fetched voices");
        Ok(body.voices)
    }
}
