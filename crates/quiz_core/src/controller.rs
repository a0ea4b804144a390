use std::{sync::Arc, time::Duration};

use shared::{
    domain::{Lifecycle, Vocabulary},
    error::PreconditionViolation,
    protocol::{SessionEvent, SessionSnapshot},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::{
    session::{AnswerCheck, FetchTag, IllustrationRequest, QuizSession, Step},
    Illustration, IllustrationProvider, SilentSpeech, SpeechPlayback,
    UnavailableIllustrationProvider,
};

pub const DEFAULT_ILLUSTRATION_TIMEOUT: Duration = Duration::from_secs(30);
const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Upper bound on a single illustration fetch; `None` waits indefinitely.
    pub illustration_timeout: Option<Duration>,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            illustration_timeout: Some(DEFAULT_ILLUSTRATION_TIMEOUT),
        }
    }
}

/// Async driver around [`QuizSession`].
///
/// All mutations go through one mutex, so operations issued from any task are
/// applied one at a time. Illustration fetches run on spawned tasks and must be
/// issued from inside a Tokio runtime; their results are applied only if the
/// fetch is still the live one.
pub struct QuizController {
    session: Mutex<QuizSession>,
    illustrations: Arc<dyn IllustrationProvider>,
    speech: Arc<dyn SpeechPlayback>,
    options: ControllerOptions,
    events: broadcast::Sender<SessionEvent>,
}

impl QuizController {
    pub fn new(vocabulary: Vocabulary) -> Arc<Self> {
        Self::new_with_dependencies(
            vocabulary,
            Arc::new(UnavailableIllustrationProvider),
            Arc::new(SilentSpeech),
            ControllerOptions::default(),
        )
    }

    pub fn new_with_dependencies(
        vocabulary: Vocabulary,
        illustrations: Arc<dyn IllustrationProvider>,
        speech: Arc<dyn SpeechPlayback>,
        options: ControllerOptions,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            session: Mutex::new(QuizSession::new(Arc::new(vocabulary))),
            illustrations,
            speech,
            options,
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot()
    }

    pub async fn start_or_advance_item(self: &Arc<Self>) {
        let mut session = self.session.lock().await;
        let step = session.start_or_advance_item();
        self.dispatch(&session, step);
    }

    pub async fn update_input(&self, text: impl Into<String>) -> Result<(), PreconditionViolation> {
        let mut session = self.session.lock().await;
        session.update_input(text).inspect_err(|reason| {
            debug!(%reason, "ignored input update");
        })
    }

    pub async fn submit_answer(&self) -> Result<AnswerCheck, PreconditionViolation> {
        let mut session = self.session.lock().await;
        let check = session.submit_answer().inspect_err(|reason| {
            debug!(%reason, "ignored answer submission");
        })?;

        let index = session.current_index();
        match check {
            AnswerCheck::Correct => {
                info!(index, "answer accepted");
                self.emit(SessionEvent::AnswerAccepted { index });
            }
            AnswerCheck::Incorrect => {
                let wrong_attempts = session.wrong_attempts();
                info!(index, wrong_attempts, "answer rejected");
                self.emit(SessionEvent::AnswerRejected {
                    index,
                    message: session.validation_error().unwrap_or_default().to_string(),
                    wrong_attempts,
                });
            }
        }
        Ok(check)
    }

    pub async fn advance(self: &Arc<Self>) -> Result<(), PreconditionViolation> {
        let mut session = self.session.lock().await;
        let step = session.advance().inspect_err(|reason| {
            debug!(%reason, "ignored advance");
        })?;
        self.dispatch(&session, step);
        Ok(())
    }

    pub async fn restart(self: &Arc<Self>) {
        let mut session = self.session.lock().await;
        let step = session.restart();
        info!(session_id = %session.session_id(), "quiz restarted");
        self.emit(SessionEvent::Restarted {
            session_id: session.session_id(),
        });
        self.dispatch(&session, step);
    }

    /// Pronounces the answer of the current item once it has been answered.
    pub async fn speak_answer(&self) -> Result<(), PreconditionViolation> {
        let session = self.session.lock().await;
        if session.lifecycle() != Lifecycle::Answered {
            return Err(PreconditionViolation::NotAnswered);
        }
        if let Some(item) = session.current_item() {
            self.speech.speak(&item.answer_text);
        }
        Ok(())
    }

    fn dispatch(self: &Arc<Self>, session: &QuizSession, step: Step) {
        match step {
            Step::Fetch(request) => {
                info!(
                    index = request.tag.index,
                    total = session.total(),
                    "loading quiz item"
                );
                self.emit(SessionEvent::ItemLoading {
                    index: request.tag.index,
                });
                self.spawn_illustration_fetch(request);
            }
            Step::Finished => {
                info!(total = session.total(), "quiz finished");
                self.emit(SessionEvent::Finished {
                    total: session.total(),
                });
            }
        }
    }

    fn spawn_illustration_fetch(self: &Arc<Self>, request: IllustrationRequest) {
        let controller = Arc::clone(self);
        tokio::spawn(async move {
            let outcome = controller.fetch_illustration(&request.subject).await;
            controller.complete_illustration(request.tag, outcome).await;
        });
    }

    async fn fetch_illustration(&self, subject: &str) -> Illustration {
        let fetch = self.illustrations.fetch_illustration(subject);
        let Some(limit) = self.options.illustration_timeout else {
            return fetch.await;
        };

        match tokio::time::timeout(limit, fetch).await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(subject, timeout_ms = limit.as_millis() as u64, "illustration fetch timed out");
                Illustration::Unavailable
            }
        }
    }

    async fn complete_illustration(&self, tag: FetchTag, outcome: Illustration) {
        let mut session = self.session.lock().await;
        if let Err(reason) = session.apply_illustration(tag, outcome) {
            debug!(index = tag.index, %reason, "dropped illustration result");
            return;
        }

        self.emit(SessionEvent::ItemReady {
            index: tag.index,
            illustration: session.illustration_view(),
        });
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine; the snapshot stays authoritative.
        let _ = self.events.send(event);
    }
}
