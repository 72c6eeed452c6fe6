use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use talk_mcp::voice::{AfterPlayback, AudioPlayer, CommandPlayer, ElevenLabsTts, SpeechSynthesizer};
use talk_mcp::{Config, Daemon, Transport};

/// talk-mcp - speak assistant replies aloud over MCP
#[derive(Parser)]
#[command(name = "talk-mcp", version, about)]
struct Cli {
    /// Transport to serve: "stdio" or "http" (overrides `MCP_TRANSPORT`)
    #[arg(long)]
    transport: Option<Transport>,

    /// HTTP bind host (overrides `MCP_HOST`)
    #[arg(long)]
    host: Option<String>,

    /// HTTP port (overrides `MCP_PORT`)
    #[arg(long)]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve MCP on the configured transport (default)
    Serve,
    /// Synthesize text and play it
    TestTts {
        /// Text to speak
        #[arg(default_value = "Hello! This is a test of the text to speech system.")]
        text: String,
        /// Voice to use instead of the configured default
        #[arg(long)]
        voice: Option<String>,
        /// Keep the synthesized file instead of deleting it after playback
        #[arg(long)]
        keep: bool,
    },
    /// Play an audio file with the configured player
    TestPlayer {
        /// File to play (never deleted)
        file: PathBuf,
    },
    /// List voices available to the configured API key
    Voices,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Set up logging based on verbosity; stdout belongs to the stdio transport
    let filter = match cli.verbose {
        0 => "info,talk_mcp=info",
        1 => "info,talk_mcp=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    if let Some(transport) = cli.transport {
        config.transport = transport;
    }
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::debug!(?config, "loaded configuration");
            Daemon::new(config).await?.run().await?;
            Ok(())
        }
        Command::TestTts { text, voice, keep } => test_tts(&config, &text, voice, keep).await,
        Command::TestPlayer { file } => test_player(&config, &file).await,
        Command::Voices => list_voices(&config).await,
    }
}

/// Synthesize and play one utterance
async fn test_tts(
    config: &Config,
    text: &str,
    voice: Option<String>,
    keep: bool,
) -> anyhow::Result<()> {
    let voice = voice.unwrap_or_else(|| config.default_voice_id.clone());
    println!("Testing TTS with voice {voice}: \"{text}\"\n");

    tokio::fs::create_dir_all(&config.tmp_dir).await?;

    let tts = ElevenLabsTts::from_config(config);
    let dest = config.speech_artifact_path();

    println!("Synthesizing speech...");
    let path = tts.synthesize(text, &voice, &dest).await?;
    let size = tokio::fs::metadata(&path).await?.len();
    println!("Wrote {size} bytes to {}", path.display());

    println!("Playing with {}...", config.audio_player);
    let after = if keep { AfterPlayback::Keep } else { AfterPlayback::Delete };
    CommandPlayer::from_config(config).play(&path, after).await?;

    println!("\n---");
    println!("If you heard the speech, TTS and playback are working!");
    if keep {
        println!("Audio kept at {}", path.display());
    }

    Ok(())
}

/// Play a file without deleting it
async fn test_player(config: &Config, file: &std::path::Path) -> anyhow::Result<()> {
    if !file.is_file() {
        anyhow::bail!("file not found: {}", file.display());
    }

    let player = CommandPlayer::from_config(config);
    println!("Playing {} with {}...", file.display(), player.binary());
    player.play(file, AfterPlayback::Keep).await?;

    println!("\n---");
    println!("If you didn't hear anything, check:");
    println!("  1. Run: pactl info | grep 'Default Sink'");
    println!("  2. Run: pw-cli ls Node (to find sink names for PIPEWIRE_SINK)");
    println!("  3. Set AUDIO_PLAYER to afplay or mpg123 if pw-play is unavailable");

    Ok(())
}

/// Print the voice catalog
async fn list_voices(config: &Config) -> anyhow::Result<()> {
    let voices = ElevenLabsTts::from_config(config).list_voices().await?;
    for voice in voices {
        println!("{}\t{}", voice.voice_id, voice.name);
    }
    Ok(())
}
