//! Pronunciation through an external text-to-speech command such as
//! `espeak -v en-us` or `say`.

use std::{
    process::{Command, Stdio},
    thread,
};

use quiz_core::SpeechPlayback;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpeech {
    program: String,
    args: Vec<String>,
}

impl CommandSpeech {
    /// Splits a command line on whitespace; the spoken text is appended as the
    /// final argument. Returns `None` for a blank command.
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    fn command(&self, text: &str) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        command
    }
}

impl SpeechPlayback for CommandSpeech {
    fn speak(&self, text: &str) {
        match self.command(text).spawn() {
            Ok(mut child) => {
                debug!(program = %self.program, text, "speaking");
                // Reap in the background so playback never blocks the quiz.
                thread::spawn(move || {
                    let _ = child.wait();
                });
            }
            Err(err) => warn!(program = %self.program, error = %err, "speech command failed"),
        }
    }
}
