use super::*;
use shared::domain::VocabularyItem;

fn vocabulary(answers: &[&str]) -> Arc<Vocabulary> {
    let items = answers
        .iter()
        .enumerate()
        .map(|(i, answer)| VocabularyItem::new(i as i64 + 1, format!("prompt-{i}"), *answer, "⭐"))
        .collect();
    Arc::new(Vocabulary::new(items).expect("vocabulary"))
}

fn expect_fetch(step: Step) -> IllustrationRequest {
    match step {
        Step::Fetch(request) => request,
        Step::Finished => panic!("expected an illustration request"),
    }
}

/// Loads the current item and resolves its illustration as unavailable.
fn load_current(session: &mut QuizSession) {
    let request = expect_fetch(session.start_or_advance_item());
    session
        .apply_illustration(request.tag, Illustration::Unavailable)
        .expect("live fetch");
}

fn answer(session: &mut QuizSession, text: &str) -> Result<AnswerCheck, PreconditionViolation> {
    session.update_input(text)?;
    session.submit_answer()
}

#[test]
fn new_session_awaits_illustration_at_first_item() {
    let session = QuizSession::new(vocabulary(&["ant"]));
    assert_eq!(session.current_index(), 0);
    assert_eq!(session.lifecycle(), Lifecycle::AwaitingIllustration);
    assert_eq!(session.illustration_view(), IllustrationView::Loading);
    assert!(session.illustration().is_none());
}

#[test]
fn fetch_is_keyed_on_answer_text() {
    let mut session = QuizSession::new(vocabulary(&["ant", "bird"]));
    let request = expect_fetch(session.start_or_advance_item());
    assert_eq!(request.subject, "ant");
    assert_eq!(request.tag.index, 0);
    assert_eq!(session.live_fetch(), Some(request.tag));
}

#[test]
fn unavailable_illustration_still_activates_with_glyph() {
    let mut session = QuizSession::new(vocabulary(&["ant"]));
    load_current(&mut session);

    assert_eq!(session.lifecycle(), Lifecycle::Active);
    assert!(session.illustration().is_none());
    assert_eq!(
        session.illustration_view(),
        IllustrationView::Glyph("⭐".to_string())
    );
}

#[test]
fn ready_illustration_is_displayed() {
    let mut session = QuizSession::new(vocabulary(&["ant"]));
    let request = expect_fetch(session.start_or_advance_item());
    let image = ImageRef::from_base64("image/jpeg", "AAEC");

    session
        .apply_illustration(request.tag, Illustration::Ready(image.clone()))
        .expect("live fetch");

    assert_eq!(session.lifecycle(), Lifecycle::Active);
    assert_eq!(session.illustration(), Some(&image));
    assert_eq!(session.illustration_view(), IllustrationView::Image(image));
}

#[test]
fn accepts_answer_regardless_of_case_and_surrounding_whitespace() {
    for attempt in [" Ant ", "ANT ", "aNt", "\tant\n"] {
        let mut session = QuizSession::new(vocabulary(&["ant"]));
        load_current(&mut session);

        assert_eq!(answer(&mut session, attempt), Ok(AnswerCheck::Correct));
        assert_eq!(session.lifecycle(), Lifecycle::Answered);
        assert_eq!(session.validation_error(), None);
    }
}

#[test]
fn wrong_answer_keeps_item_active_and_preserves_input() {
    let mut session = QuizSession::new(vocabulary(&["bird"]));
    load_current(&mut session);

    assert_eq!(answer(&mut session, "cat"), Ok(AnswerCheck::Incorrect));
    assert_eq!(session.lifecycle(), Lifecycle::Active);
    assert_eq!(session.validation_error(), Some(WRONG_ANSWER_MESSAGE));
    assert_eq!(session.pending_input(), "cat");
    assert_eq!(session.wrong_attempts(), 1);

    assert_eq!(session.submit_answer(), Ok(AnswerCheck::Incorrect));
    assert_eq!(session.wrong_attempts(), 2);
}

#[test]
fn input_update_clears_validation_error_whatever_the_text() {
    let mut session = QuizSession::new(vocabulary(&["bird"]));
    load_current(&mut session);
    answer(&mut session, "cat").expect("submitted");

    session.update_input("cat").expect("active");
    assert_eq!(session.validation_error(), None);

    session.submit_answer().expect("submitted");
    session.update_input("").expect("active");
    assert_eq!(session.validation_error(), None);
}

#[test]
fn empty_and_whitespace_submissions_are_ignored() {
    let mut session = QuizSession::new(vocabulary(&["ant"]));
    load_current(&mut session);

    assert_eq!(session.submit_answer(), Err(PreconditionViolation::EmptyInput));
    assert_eq!(
        answer(&mut session, "   \t"),
        Err(PreconditionViolation::EmptyInput)
    );
    assert_eq!(session.lifecycle(), Lifecycle::Active);
    assert_eq!(session.validation_error(), None);
    assert_eq!(session.wrong_attempts(), 0);
}

#[test]
fn input_is_only_editable_while_active() {
    let mut session = QuizSession::new(vocabulary(&["ant"]));
    session.start_or_advance_item();
    assert_eq!(
        session.update_input("ant"),
        Err(PreconditionViolation::NotActive)
    );
    assert_eq!(session.submit_answer(), Err(PreconditionViolation::NotActive));
    assert_eq!(session.pending_input(), "");

    let tag = session.live_fetch().expect("live fetch");
    session
        .apply_illustration(tag, Illustration::Unavailable)
        .expect("live");
    answer(&mut session, "ant").expect("correct");
    assert_eq!(
        session.update_input("other"),
        Err(PreconditionViolation::NotActive)
    );
    assert_eq!(session.pending_input(), "ant");
}

#[test]
fn submit_is_idempotent_once_answered() {
    let mut session = QuizSession::new(vocabulary(&["ant"]));
    load_current(&mut session);
    answer(&mut session, "ant").expect("correct");

    assert_eq!(
        session.submit_answer(),
        Err(PreconditionViolation::AlreadyAnswered)
    );
    assert_eq!(session.lifecycle(), Lifecycle::Answered);
}

#[test]
fn stale_fetch_for_previous_item_is_dropped() {
    let mut session = QuizSession::new(vocabulary(&["ant", "bird"]));
    let first = expect_fetch(session.start_or_advance_item());
    session
        .apply_illustration(first.tag, Illustration::Unavailable)
        .expect("live");
    answer(&mut session, "ant").expect("correct");
    let second = expect_fetch(session.advance().expect("advance"));
    assert_eq!(second.tag.index, 1);

    let stale = ImageRef::new("https://example.test/ant.png");
    assert_eq!(
        session.apply_illustration(first.tag, Illustration::Ready(stale)),
        Err(PreconditionViolation::StaleIllustration)
    );
    assert_eq!(session.lifecycle(), Lifecycle::AwaitingIllustration);
    assert!(session.illustration().is_none());
    assert_eq!(session.live_fetch(), Some(second.tag));
}

#[test]
fn restart_invalidates_fetch_for_the_same_index() {
    let mut session = QuizSession::new(vocabulary(&["ant", "bird"]));
    let before = expect_fetch(session.start_or_advance_item());
    let after = expect_fetch(session.restart());

    assert_eq!(before.tag.index, after.tag.index);
    assert_ne!(before.tag, after.tag);
    assert_eq!(
        session.apply_illustration(before.tag, Illustration::Unavailable),
        Err(PreconditionViolation::StaleIllustration)
    );
    assert_eq!(session.lifecycle(), Lifecycle::AwaitingIllustration);

    session
        .apply_illustration(after.tag, Illustration::Unavailable)
        .expect("live");
    assert_eq!(session.lifecycle(), Lifecycle::Active);
}

#[test]
fn illustration_result_is_applied_once() {
    let mut session = QuizSession::new(vocabulary(&["ant"]));
    let request = expect_fetch(session.start_or_advance_item());
    session
        .apply_illustration(request.tag, Illustration::Unavailable)
        .expect("live");

    assert_eq!(
        session.apply_illustration(
            request.tag,
            Illustration::Ready(ImageRef::new("late.png"))
        ),
        Err(PreconditionViolation::StaleIllustration)
    );
    assert!(session.illustration().is_none());
}

#[test]
fn advance_requires_an_answered_item() {
    let mut session = QuizSession::new(vocabulary(&["ant", "bird"]));
    load_current(&mut session);
    assert_eq!(session.advance(), Err(PreconditionViolation::NotAnswered));

    answer(&mut session, "bee").expect("submitted");
    assert_eq!(session.advance(), Err(PreconditionViolation::NotAnswered));
    assert_eq!(session.current_index(), 0);
}

#[test]
fn exactly_n_correct_answers_finish_the_quiz() {
    let words = ["ant", "bird", "cat", "dog", "tiger", "zebra"];
    for n in 1..=words.len() {
        let mut session = QuizSession::new(vocabulary(&words[..n]));
        load_current(&mut session);

        for (i, word) in words[..n].iter().enumerate() {
            for _ in 0..(i % 3) {
                assert_eq!(answer(&mut session, "wrong"), Ok(AnswerCheck::Incorrect));
            }
            assert_ne!(session.lifecycle(), Lifecycle::Finished);
            assert_eq!(answer(&mut session, word), Ok(AnswerCheck::Correct));

            match session.advance().expect("advance") {
                Step::Fetch(request) => {
                    assert!(i + 1 < n, "fetch issued past the last item");
                    session
                        .apply_illustration(request.tag, Illustration::Unavailable)
                        .expect("live");
                }
                Step::Finished => assert_eq!(i + 1, n),
            }
        }

        assert_eq!(session.lifecycle(), Lifecycle::Finished);
        assert_eq!(session.current_index(), n);
        assert!(session.current_item().is_none());
        assert_eq!(session.illustration_view(), IllustrationView::Empty);
    }
}

#[test]
fn finished_is_terminal_until_restart() {
    let mut session = QuizSession::new(vocabulary(&["ant"]));
    load_current(&mut session);
    answer(&mut session, "ant").expect("correct");
    assert_eq!(session.advance(), Ok(Step::Finished));

    assert_eq!(session.advance(), Err(PreconditionViolation::Finished));
    assert_eq!(session.update_input("x"), Err(PreconditionViolation::Finished));
    assert_eq!(session.submit_answer(), Err(PreconditionViolation::Finished));
    assert_eq!(session.start_or_advance_item(), Step::Finished);
    assert_eq!(session.lifecycle(), Lifecycle::Finished);
}

#[test]
fn restart_from_finished_reloads_first_item() {
    let mut session = QuizSession::new(vocabulary(&["ant"]));
    let first_session = session.session_id();
    load_current(&mut session);
    answer(&mut session, "ant").expect("correct");
    session.advance().expect("finish");

    let request = expect_fetch(session.restart());
    assert_eq!(request.subject, "ant");
    assert_eq!(session.current_index(), 0);
    assert_eq!(session.lifecycle(), Lifecycle::AwaitingIllustration);
    assert_eq!(session.pending_input(), "");
    assert_ne!(session.session_id(), first_session);
}

#[test]
fn validation_error_does_not_survive_item_reload() {
    let mut session = QuizSession::new(vocabulary(&["ant", "bird"]));
    load_current(&mut session);
    answer(&mut session, "bee").expect("submitted");
    assert!(session.validation_error().is_some());

    session.restart();
    assert_eq!(session.validation_error(), None);
    assert_eq!(session.wrong_attempts(), 0);
}

#[test]
fn comparison_does_not_fold_accents_or_punctuation() {
    let mut session = QuizSession::new(vocabulary(&["café"]));
    load_current(&mut session);
    assert_eq!(answer(&mut session, "cafe"), Ok(AnswerCheck::Incorrect));
    assert_eq!(answer(&mut session, "café."), Ok(AnswerCheck::Incorrect));
    assert_eq!(answer(&mut session, " CAFÉ "), Ok(AnswerCheck::Correct));
}

#[test]
fn snapshot_reports_progress() {
    let mut session = QuizSession::new(vocabulary(&["ant", "bird"]));
    load_current(&mut session);
    answer(&mut session, "ant").expect("correct");

    let snapshot = session.snapshot();
    assert_eq!(snapshot.current_index, 0);
    assert_eq!(snapshot.position(), 1);
    assert_eq!(snapshot.total, 2);
    assert_eq!(snapshot.lifecycle, Lifecycle::Answered);
    assert_eq!(snapshot.pending_input, "ant");
    assert_eq!(
        snapshot.item.map(|item| item.answer_text),
        Some("ant".to_string())
    );
}
