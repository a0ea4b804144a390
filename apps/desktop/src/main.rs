use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use illustration::ImagenClient;
use quiz_core::{
    ControllerOptions, IllustrationProvider, QuizController, SilentSpeech, SpeechPlayback,
    UnavailableIllustrationProvider,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod speech;
mod terminal;

use config::{load_settings, load_vocabulary};
use speech::CommandSpeech;
use terminal::TerminalOptions;

/// Spell the English word for each pictured animal.
#[derive(Parser, Debug)]
#[command(name = "spelling-zoo")]
struct Args {
    /// TOML settings file (defaults to ./spelling-zoo.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    /// TOML or JSON vocabulary file replacing the built-in animal list.
    #[arg(long)]
    vocabulary: Option<PathBuf>,
    /// Skip image generation and always show the fallback glyph.
    #[arg(long)]
    no_illustrations: bool,
    /// Directory where generated illustrations are written.
    #[arg(long)]
    save_illustrations: Option<PathBuf>,
    /// Text-to-speech command; the word is appended as the last argument.
    #[arg(long)]
    speech_command: Option<String>,
    /// Seconds to wait for an illustration, 0 to wait indefinitely.
    #[arg(long)]
    illustration_timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(path) = args.vocabulary {
        settings.vocabulary_path = Some(path);
    }
    if let Some(command) = args.speech_command {
        settings.speech_command = Some(command);
    }
    if let Some(secs) = args.illustration_timeout_secs {
        settings.illustration_timeout_secs = secs;
    }

    let vocabulary = load_vocabulary(settings.vocabulary_path.as_deref())?;
    info!(items = vocabulary.len(), "vocabulary loaded");

    let illustrations: Arc<dyn IllustrationProvider> = if args.no_illustrations {
        Arc::new(UnavailableIllustrationProvider)
    } else {
        let client = ImagenClient::new(settings.imagen_config());
        if !client.is_configured() {
            info!("no API key configured; illustrations fall back to glyphs");
        }
        Arc::new(client)
    };

    let speech: Arc<dyn SpeechPlayback> =
        match settings.speech_command.as_deref().and_then(CommandSpeech::parse) {
            Some(command) => Arc::new(command),
            None => Arc::new(SilentSpeech),
        };

    let controller = QuizController::new_with_dependencies(
        vocabulary.clone(),
        illustrations,
        speech,
        ControllerOptions {
            illustration_timeout: settings.illustration_timeout(),
        },
    );

    terminal::run(
        controller,
        vocabulary,
        TerminalOptions {
            save_dir: args.save_illustrations,
        },
    )
    .await
}
