//! Line-oriented presentation of a quiz session.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use quiz_core::QuizController;
use shared::{
    domain::{ImageRef, Lifecycle, Vocabulary},
    protocol::{IllustrationView, SessionEvent},
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::error::RecvError,
};
use tracing::{debug, warn};

pub const HELP: &str = "\
Commands:
  <word>     submit an answer
  <Enter>    next word after a correct answer, play again when finished
  :speak     hear the answer (after answering correctly)
  :restart   start over from the first word
  :quit      leave the zoo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Answer(String),
    Next,
    Speak,
    Restart,
    Help,
    Quit,
    Ignore,
}

pub fn parse_line(line: &str, lifecycle: Lifecycle) -> InputAction {
    match line.trim() {
        ":q" | ":quit" | ":exit" => return InputAction::Quit,
        ":restart" => return InputAction::Restart,
        ":speak" | ":say" => return InputAction::Speak,
        ":h" | ":help" => return InputAction::Help,
        ":next" => return InputAction::Next,
        _ => {}
    }

    match lifecycle {
        // Empty lines are forwarded too; the controller ignores them.
        Lifecycle::Active => InputAction::Answer(line.to_string()),
        Lifecycle::Answered => InputAction::Next,
        Lifecycle::Finished if line.trim().is_empty() => InputAction::Restart,
        Lifecycle::Finished | Lifecycle::AwaitingIllustration => InputAction::Ignore,
    }
}

#[derive(Debug, Clone, Default)]
pub struct TerminalOptions {
    pub save_dir: Option<PathBuf>,
}

/// Writes an inline illustration to `dir` as `item-<n>.<ext>`. Remote
/// references are not downloaded.
pub fn save_illustration(
    dir: &Path,
    index: usize,
    image: &ImageRef,
) -> anyhow::Result<Option<PathBuf>> {
    let Some((mime_type, payload)) = image.inline_parts() else {
        return Ok(None);
    };

    let bytes = STANDARD
        .decode(payload)
        .context("illustration payload is not valid base64")?;
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create '{}'", dir.display()))?;

    let path = dir.join(format!("item-{}.{}", index + 1, extension_for(mime_type)));
    fs::write(&path, bytes).with_context(|| format!("failed to write '{}'", path.display()))?;
    Ok(Some(path))
}

fn extension_for(mime_type: &str) -> &'static str {
    match mime_type {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "bin",
    }
}

fn describe_image(image: &ImageRef, saved: Option<&Path>) -> String {
    match (saved, image.inline_parts()) {
        (Some(path), _) => format!("[illustration saved to {}]", path.display()),
        (None, Some((mime_type, payload))) => {
            format!("[illustration ready: {mime_type}, ~{} KB]", payload.len() * 3 / 4 / 1024)
        }
        (None, None) => format!("[illustration: {}]", image.as_str()),
    }
}

/// Text shown for one session event.
pub fn render(event: &SessionEvent, vocabulary: &Vocabulary, saved: Option<&Path>) -> String {
    let total = vocabulary.len();
    match event {
        SessionEvent::ItemLoading { index } => {
            let prompt = vocabulary
                .get(*index)
                .map(|item| item.prompt_text.as_str())
                .unwrap_or_default();
            format!(
                "\n── Spelling Zoo ── word {} / {total}\nWhat is this in English?\n\n    {prompt}\n\nPainting an illustration...",
                index + 1
            )
        }
        SessionEvent::ItemReady { illustration, .. } => {
            let picture = match illustration {
                IllustrationView::Image(image) => describe_image(image, saved),
                IllustrationView::Glyph(glyph) => format!("    {glyph}"),
                IllustrationView::Loading | IllustrationView::Empty => String::new(),
            };
            format!("{picture}\nType your answer and press Enter (:help for commands).")
        }
        SessionEvent::AnswerAccepted { index } => {
            let answer = vocabulary
                .get(*index)
                .map(|item| item.answer_text.as_str())
                .unwrap_or_default();
            let next = if index + 1 < total {
                "Press Enter for the next word"
            } else {
                "Press Enter to finish"
            };
            format!("Correct! It's a {answer}. {next} (:speak to hear it).")
        }
        SessionEvent::AnswerRejected {
            message,
            wrong_attempts,
            ..
        } => format!("✗ {message} (attempt {wrong_attempts}), please try again!"),
        SessionEvent::Finished { total } => format!(
            "\n★ Well done! You spelled all {total} words.\nPress Enter to play again or :quit to leave."
        ),
        SessionEvent::Restarted { .. } => "\nStarting over...".to_string(),
    }
}

pub async fn run(
    controller: Arc<QuizController>,
    vocabulary: Vocabulary,
    options: TerminalOptions,
) -> anyhow::Result<()> {
    let mut events = controller.subscribe_events();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    controller.start_or_advance_item().await;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(event) => {
                    let saved = saved_illustration(&event, &options);
                    println!("{}", render(&event, &vocabulary, saved.as_deref()));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "terminal fell behind session events");
                }
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read answer from stdin")? else {
                    break;
                };
                let lifecycle = controller.snapshot().await.lifecycle;
                if !handle_action(&controller, parse_line(&line, lifecycle)).await {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Applies one learner action. Returns `false` when the learner quits.
async fn handle_action(controller: &Arc<QuizController>, action: InputAction) -> bool {
    match action {
        InputAction::Quit => return false,
        InputAction::Help => println!("{HELP}"),
        InputAction::Restart => controller.restart().await,
        InputAction::Next => {
            let _ = controller.advance().await;
        }
        InputAction::Speak => {
            if controller.speak_answer().await.is_err() {
                println!("Spell the word first, then :speak.");
            }
        }
        InputAction::Answer(text) => {
            if controller.update_input(text).await.is_ok() {
                let _ = controller.submit_answer().await;
            }
        }
        InputAction::Ignore => debug!("input ignored while illustration loads"),
    }
    true
}

fn saved_illustration(event: &SessionEvent, options: &TerminalOptions) -> Option<PathBuf> {
    let SessionEvent::ItemReady {
        index,
        illustration: IllustrationView::Image(image),
    } = event
    else {
        return None;
    };
    let dir = options.save_dir.as_deref()?;

    match save_illustration(dir, *index, image) {
        Ok(path) => path,
        Err(err) => {
            warn!(error = %format!("{err:#}"), "failed to save illustration");
            None
        }
    }
}

#[cfg(test)]
#[path = "tests/terminal_tests.rs"]
mod tests;
