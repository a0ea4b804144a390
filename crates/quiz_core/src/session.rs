//! Synchronous quiz state machine. Every transition is a method on
//! [`QuizSession`]; illustration fetching is represented by the
//! [`IllustrationRequest`] a transition hands back, and its completion is fed in
//! through [`QuizSession::apply_illustration`].

use std::sync::Arc;

use shared::{
    domain::{ImageRef, Lifecycle, Vocabulary, VocabularyItem},
    error::PreconditionViolation,
    protocol::{IllustrationView, SessionSnapshot},
};
use uuid::Uuid;

use crate::Illustration;

pub const WRONG_ANSWER_MESSAGE: &str = "wrong answer";

/// Identifies one illustration fetch. A completion is honoured only while its
/// tag is the live one for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FetchTag {
    pub index: usize,
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IllustrationRequest {
    pub tag: FetchTag,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Fetch(IllustrationRequest),
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerCheck {
    Correct,
    Incorrect,
}

pub fn normalize_answer(text: &str) -> String {
    text.trim().to_lowercase()
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    vocabulary: Arc<Vocabulary>,
    session_id: Uuid,
    current_index: usize,
    lifecycle: Lifecycle,
    pending_input: String,
    validation_error: Option<String>,
    illustration: Option<ImageRef>,
    live_fetch: Option<FetchTag>,
    next_generation: u64,
    wrong_attempts: u32,
}

impl QuizSession {
    pub fn new(vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            vocabulary,
            session_id: Uuid::new_v4(),
            current_index: 0,
            lifecycle: Lifecycle::AwaitingIllustration,
            pending_input: String::new(),
            validation_error: None,
            illustration: None,
            live_fetch: None,
            next_generation: 0,
            wrong_attempts: 0,
        }
    }

    /// Loads the item at the current index, or finishes the quiz when every
    /// item has been answered.
    pub fn start_or_advance_item(&mut self) -> Step {
        self.pending_input.clear();
        self.validation_error = None;
        self.illustration = None;
        self.wrong_attempts = 0;

        let Some(item) = self.vocabulary.get(self.current_index) else {
            self.finish();
            return Step::Finished;
        };

        let tag = FetchTag {
            index: self.current_index,
            generation: self.next_generation,
        };
        self.next_generation += 1;
        self.live_fetch = Some(tag);
        self.lifecycle = Lifecycle::AwaitingIllustration;

        // The picture depicts the answer, not the learner-visible prompt.
        Step::Fetch(IllustrationRequest {
            tag,
            subject: item.answer_text.clone(),
        })
    }

    pub fn apply_illustration(
        &mut self,
        tag: FetchTag,
        outcome: Illustration,
    ) -> Result<(), PreconditionViolation> {
        if self.live_fetch != Some(tag) || self.lifecycle != Lifecycle::AwaitingIllustration {
            return Err(PreconditionViolation::StaleIllustration);
        }

        self.live_fetch = None;
        self.illustration = match outcome {
            Illustration::Ready(image) => Some(image),
            Illustration::Unavailable => None,
        };
        self.lifecycle = Lifecycle::Active;
        Ok(())
    }

    pub fn update_input(&mut self, text: impl Into<String>) -> Result<(), PreconditionViolation> {
        self.require_active()?;
        self.pending_input = text.into();
        self.validation_error = None;
        Ok(())
    }

    pub fn submit_answer(&mut self) -> Result<AnswerCheck, PreconditionViolation> {
        match self.lifecycle {
            Lifecycle::Answered => return Err(PreconditionViolation::AlreadyAnswered),
            _ => self.require_active()?,
        }

        let attempt = normalize_answer(&self.pending_input);
        if attempt.is_empty() {
            return Err(PreconditionViolation::EmptyInput);
        }

        let Some(item) = self.vocabulary.get(self.current_index) else {
            return Err(PreconditionViolation::Finished);
        };

        if attempt == normalize_answer(&item.answer_text) {
            self.lifecycle = Lifecycle::Answered;
            self.validation_error = None;
            Ok(AnswerCheck::Correct)
        } else {
            self.validation_error = Some(WRONG_ANSWER_MESSAGE.to_string());
            self.wrong_attempts = self.wrong_attempts.saturating_add(1);
            Ok(AnswerCheck::Incorrect)
        }
    }

    pub fn advance(&mut self) -> Result<Step, PreconditionViolation> {
        match self.lifecycle {
            Lifecycle::Finished => Err(PreconditionViolation::Finished),
            Lifecycle::Answered => {
                if self.current_index + 1 < self.vocabulary.len() {
                    self.current_index += 1;
                    Ok(self.start_or_advance_item())
                } else {
                    self.finish();
                    Ok(Step::Finished)
                }
            }
            _ if self.current_index >= self.vocabulary.len() => {
                self.finish();
                Ok(Step::Finished)
            }
            _ => Err(PreconditionViolation::NotAnswered),
        }
    }

    /// Discards all progress and loads the first item of a fresh session.
    pub fn restart(&mut self) -> Step {
        self.session_id = Uuid::new_v4();
        self.current_index = 0;
        self.start_or_advance_item()
    }

    fn finish(&mut self) {
        self.current_index = self.vocabulary.len();
        self.lifecycle = Lifecycle::Finished;
        self.validation_error = None;
        self.illustration = None;
        self.live_fetch = None;
    }

    fn require_active(&self) -> Result<(), PreconditionViolation> {
        match self.lifecycle {
            Lifecycle::Active => Ok(()),
            Lifecycle::Finished => Err(PreconditionViolation::Finished),
            _ => Err(PreconditionViolation::NotActive),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn total(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn pending_input(&self) -> &str {
        &self.pending_input
    }

    pub fn validation_error(&self) -> Option<&str> {
        self.validation_error.as_deref()
    }

    pub fn illustration(&self) -> Option<&ImageRef> {
        self.illustration.as_ref()
    }

    pub fn wrong_attempts(&self) -> u32 {
        self.wrong_attempts
    }

    pub fn current_item(&self) -> Option<&VocabularyItem> {
        self.vocabulary.get(self.current_index)
    }

    pub fn live_fetch(&self) -> Option<FetchTag> {
        self.live_fetch
    }

    pub fn illustration_view(&self) -> IllustrationView {
        match (self.lifecycle, &self.illustration, self.current_item()) {
            (Lifecycle::AwaitingIllustration, _, _) => IllustrationView::Loading,
            (Lifecycle::Finished, _, _) | (_, _, None) => IllustrationView::Empty,
            (_, Some(image), _) => IllustrationView::Image(image.clone()),
            (_, None, Some(item)) => IllustrationView::Glyph(item.accent_glyph.clone()),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id,
            current_index: self.current_index,
            total: self.total(),
            lifecycle: self.lifecycle,
            pending_input: self.pending_input.clone(),
            validation_error: self.validation_error.clone(),
            illustration: self.illustration_view(),
            item: self.current_item().cloned(),
            wrong_attempts: self.wrong_attempts,
        }
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
