//! Daemon - wires configuration, voice backends and the MCP transport

use std::sync::Arc;

use crate::api::ApiServer;
use crate::config::Transport;
use crate::mcp::{McpServer, stdio};
use crate::tools::TalkTools;
use crate::{Config, Result};

/// The talk-mcp service
pub struct Daemon {
    config: Arc<Config>,
    server: Arc<McpServer>,
}

impl Daemon {
    /// Create a daemon backed by ElevenLabs and the configured player
    ///
    /// # Errors
    ///
    /// Returns error if the speech artifact directory cannot be created
    pub async fn new(config: Config) -> Result<Self> {
        let config = Arc::new(config);

        tokio::fs::create_dir_all(&config.tmp_dir).await?;

        if config.api_key.is_none() {
            tracing::warn!("ELEVENLABS_API_KEY is not set; speak and list_voices will fail");
        }

        if !config.audio_files_dir.is_dir() {
            tracing::warn!(
                path = %config.audio_files_dir.display(),
                "audio files directory does not exist; samples and templates unavailable"
            );
        }

        let tools = TalkTools::from_config(Arc::clone(&config));
        let server = Arc::new(McpServer::new(tools));

        Ok(Self { config, server })
    }

    /// Create a daemon around an already-built server
    #[must_use]
    pub const fn with_server(config: Arc<Config>, server: Arc<McpServer>) -> Self {
        Self { config, server }
    }

    #[must_use]
    pub fn server(&self) -> Arc<McpServer> {
        Arc::clone(&self.server)
    }

    /// Serve on the configured transport until it closes or is interrupted
    ///
    /// # Errors
    ///
    /// Returns error if the transport fails
    pub async fn run(self) -> Result<()> {
        tracing::info!(
            transport = %self.config.transport,
            voice = %self.config.default_voice_id,
            model = %self.config.model_id,
            player = %self.config.audio_player,
            audio_dir = %self.config.audio_files_dir.display(),
            "daemon running"
        );

        match self.config.transport {
            Transport::Stdio => stdio::serve(&self.server).await,
            Transport::Http => {
                ApiServer::new(Arc::clone(&self.server), self.config.bind_addr())
                    .run()
                    .await
            }
        }
    }
}
