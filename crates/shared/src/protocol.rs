use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{ImageRef, Lifecycle, VocabularyItem};

/// What the presentation layer should draw in the illustration slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum IllustrationView {
    Loading,
    Image(ImageRef),
    /// Illustration unavailable; overlay the item's accent glyph instead.
    Glyph(String),
    /// Nothing to show, the quiz is finished.
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: Uuid,
    pub current_index: usize,
    pub total: usize,
    pub lifecycle: Lifecycle,
    pub pending_input: String,
    pub validation_error: Option<String>,
    pub illustration: IllustrationView,
    pub item: Option<VocabularyItem>,
    pub wrong_attempts: u32,
}

impl SessionSnapshot {
    /// 1-based position for progress display, clamped to `total`.
    pub fn position(&self) -> usize {
        (self.current_index + 1).min(self.total)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SessionEvent {
    ItemLoading {
        index: usize,
    },
    ItemReady {
        index: usize,
        illustration: IllustrationView,
    },
    AnswerAccepted {
        index: usize,
    },
    AnswerRejected {
        index: usize,
        message: String,
        wrong_attempts: u32,
    },
    Finished {
        total: usize,
    },
    Restarted {
        session_id: Uuid,
    },
}
