use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clap::{Parser, Subcommand};
use illustration::{
    ImageGenerator, ImagenClient, ImagenConfig, DEFAULT_IMAGEN_BASE_URL, DEFAULT_IMAGEN_MODEL,
};
use shared::{domain::Vocabulary, vocabulary_file::VocabularyFile};

#[derive(Parser, Debug)]
#[command(name = "quiz-tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a vocabulary file.
    Check { path: PathBuf },
    /// Print the vocabulary in quiz order.
    List {
        #[arg(long)]
        vocabulary: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Generate one illustration and write it to disk.
    Illustrate {
        subject: String,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, env = "GEMINI_API_KEY")]
        api_key: Option<String>,
        #[arg(long, default_value = DEFAULT_IMAGEN_MODEL)]
        model: String,
        #[arg(long, default_value = DEFAULT_IMAGEN_BASE_URL)]
        base_url: String,
    },
}

fn load(path: Option<&Path>) -> Result<Vocabulary> {
    match path {
        Some(path) => VocabularyFile::read(path)
            .and_then(VocabularyFile::into_vocabulary)
            .with_context(|| format!("failed to load vocabulary from '{}'", path.display())),
        None => Ok(Vocabulary::builtin_animals()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Check { path } => {
            let vocabulary = load(Some(&path))?;
            println!("ok: {} items in {}", vocabulary.len(), path.display());
        }
        Command::List { vocabulary, json } => {
            let vocabulary = load(vocabulary.as_deref())?;
            if json {
                let file = VocabularyFile::from_vocabulary(&vocabulary);
                println!("{}", serde_json::to_string_pretty(&file)?);
            } else {
                for (position, item) in vocabulary.items().iter().enumerate() {
                    println!(
                        "{:>3}. [{}] {} -> {} {}",
                        position + 1,
                        item.id.0,
                        item.prompt_text,
                        item.answer_text,
                        item.accent_glyph
                    );
                }
            }
        }
        Command::Illustrate {
            subject,
            out,
            api_key,
            model,
            base_url,
        } => {
            let client = ImagenClient::new(ImagenConfig {
                api_key,
                model,
                base_url,
            });
            let image = client.generate(&subject).await?;
            let (mime_type, payload) = image
                .inline_parts()
                .ok_or_else(|| anyhow!("provider returned a non-inline image reference"))?;
            let bytes = STANDARD.decode(payload)?;
            std::fs::write(&out, &bytes)
                .with_context(|| format!("failed to write '{}'", out.display()))?;
            println!(
                "wrote {} bytes ({mime_type}) to {}",
                bytes.len(),
                out.display()
            );
        }
    }

    Ok(())
}
