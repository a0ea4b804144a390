use async_trait::async_trait;
use illustration::{IllustrationError, ImageGenerator};
use shared::domain::ImageRef;
use tracing::{debug, warn};

mod controller;
pub mod session;

pub use controller::{ControllerOptions, QuizController, DEFAULT_ILLUSTRATION_TIMEOUT};
pub use session::{
    normalize_answer, AnswerCheck, FetchTag, IllustrationRequest, QuizSession, Step,
    WRONG_ANSWER_MESSAGE,
};

/// Result of an illustration fetch as seen by the quiz. Failures never reach
/// the session; they collapse into `Unavailable`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Illustration {
    Ready(ImageRef),
    Unavailable,
}

#[async_trait]
pub trait IllustrationProvider: Send + Sync {
    async fn fetch_illustration(&self, subject: &str) -> Illustration;
}

pub struct UnavailableIllustrationProvider;

#[async_trait]
impl IllustrationProvider for UnavailableIllustrationProvider {
    async fn fetch_illustration(&self, _subject: &str) -> Illustration {
        Illustration::Unavailable
    }
}

#[async_trait]
impl<T> IllustrationProvider for T
where
    T: ImageGenerator,
{
    async fn fetch_illustration(&self, subject: &str) -> Illustration {
        match self.generate(subject).await {
            Ok(image) => Illustration::Ready(image),
            Err(IllustrationError::MissingCredentials) => {
                debug!(subject, "no image generation credentials; using glyph");
                Illustration::Unavailable
            }
            Err(err) => {
                warn!(subject, error = %err, "illustration generation failed; using glyph");
                Illustration::Unavailable
            }
        }
    }
}

/// Fire-and-forget pronunciation of a word.
pub trait SpeechPlayback: Send + Sync {
    fn speak(&self, text: &str);
}

pub struct SilentSpeech;

impl SpeechPlayback for SilentSpeech {
    fn speak(&self, text: &str) {
        debug!(text, "speech playback disabled");
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
