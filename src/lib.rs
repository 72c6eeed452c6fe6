//! talk-mcp - speak assistant replies aloud over MCP
//!
//! This library provides the pieces of the talk-mcp server:
//! - Configuration from environment, `.env` and an optional TOML file
//! - Speech synthesis through ElevenLabs
//! - Playback through an external player (`pw-play`, `afplay`, `mpg123`)
//! - Pre-recorded reply templates
//! - MCP over stdio or HTTP
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │        MCP client (agent, IDE, chat app)      │
//! └───────────────┬──────────────────────────────┘
//!                 │  stdio  │  HTTP /mcp
//! ┌───────────────▼──────────────────────────────┐
//! │   McpServer → ToolExecutor → TalkTools        │
//! │   (per-session voice)                         │
//! └──────┬──────────────┬──────────────┬─────────┘
//!        │              │              │
//!  ElevenLabsTts   CommandPlayer   TemplateRegistry
//! ```

pub mod api;
pub mod config;
pub mod daemon;
pub mod error;
pub mod mcp;
pub mod prompt;
pub mod session;
pub mod templates;
pub mod tools;
pub mod voice;

pub use config::{Config, Transport};
pub use daemon::Daemon;
pub use error::{Error, Result};
pub use mcp::McpServer;
pub use session::{Session, SessionStore};
pub use templates::{Template, TemplateRegistry};
pub use tools::{TalkTools, ToolExecutor, ToolOutcome};
pub use voice::{AfterPlayback, AudioPlayer, CommandPlayer, ElevenLabsTts, SpeechSynthesizer, Voice};
