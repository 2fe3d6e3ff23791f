use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info};

use quiz_core::model::{
    Difficulty, LeaderboardEntry, NewLeaderboardEntry, PlayerName, PlayerNameError,
    QuestionTicket,
};
use quiz_core::{AnswerResult, GameSummary, QuizEngine};
use storage::repository::LeaderboardRepository;

use super::progress::{GameProgress, QuestionPrompt};
use crate::Clock;
use crate::account_service::Identity;
use crate::error::GameServiceError;

/// Drives a player's `QuizEngine` with the service clock and saves finished
/// games to the leaderboard.
#[derive(Clone)]
pub struct GameService {
    clock: Clock,
    leaderboard: Arc<dyn LeaderboardRepository>,
}

impl GameService {
    #[must_use]
    pub fn new(clock: Clock, leaderboard: Arc<dyn LeaderboardRepository>) -> Self {
        Self { clock, leaderboard }
    }

    /// Start a new game, replacing whatever the engine held.
    pub fn start_game(&self, engine: &mut QuizEngine, difficulty: Difficulty) -> GameProgress {
        let session = engine.start_session(difficulty, self.clock.now());
        info!(difficulty = difficulty.as_code(), "game started");
        GameProgress::from_session(session)
    }

    /// # Errors
    ///
    /// Returns `QuizError::NoActiveSession` if no game was started.
    pub fn progress(&self, engine: &QuizEngine) -> Result<GameProgress, GameServiceError> {
        Ok(GameProgress::from_session(engine.session()?))
    }

    /// Draw the next question using the thread-local RNG.
    ///
    /// # Errors
    ///
    /// Returns engine errors such as `NoActiveSession` or `GameOver`.
    pub fn next_question(&self, engine: &mut QuizEngine) -> Result<QuestionPrompt, GameServiceError> {
        self.next_question_with(engine, &mut rand::rng())
    }

    /// Draw the next question from a caller-supplied RNG.
    ///
    /// # Errors
    ///
    /// Returns engine errors such as `NoActiveSession` or `GameOver`.
    pub fn next_question_with<R: Rng + ?Sized>(
        &self,
        engine: &mut QuizEngine,
        rng: &mut R,
    ) -> Result<QuestionPrompt, GameServiceError> {
        let question = engine.generate_question(rng, self.clock.now())?;
        let prompt = QuestionPrompt::new(&question, engine.session()?);
        debug!(ticket = %prompt.ticket, difficulty = prompt.difficulty.as_code(), "question issued");
        Ok(prompt)
    }

    /// Submit raw player input for whichever question is pending.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::InvalidAnswerInput` for non-numeric input and
    /// `QuizError::NoActiveQuestion` when nothing is pending.
    pub fn submit_answer(
        &self,
        engine: &mut QuizEngine,
        raw: &str,
    ) -> Result<AnswerResult, GameServiceError> {
        let result = engine.submit_raw(raw, self.clock.now())?;
        log_result(&result);
        Ok(result)
    }

    /// Submit raw player input for a specific question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::StaleQuestion` if `ticket` is no longer pending,
    /// plus the errors of `submit_answer`.
    pub fn submit_for(
        &self,
        engine: &mut QuizEngine,
        ticket: QuestionTicket,
        raw: &str,
    ) -> Result<AnswerResult, GameServiceError> {
        let result = engine.submit_raw_for(ticket, raw, self.clock.now())?;
        log_result(&result);
        Ok(result)
    }

    /// Record that the timer for `ticket` ran out.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::StaleQuestion` or `QuizError::NoActiveQuestion` if
    /// the question was already answered.
    pub fn time_out(
        &self,
        engine: &mut QuizEngine,
        ticket: QuestionTicket,
    ) -> Result<AnswerResult, GameServiceError> {
        let result = engine.handle_timeout_for(ticket, self.clock.now())?;
        log_result(&result);
        Ok(result)
    }

    /// End the game and return its summary. Safe to call more than once.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoActiveSession` if no game was started.
    pub fn finish(&self, engine: &mut QuizEngine) -> Result<GameSummary, GameServiceError> {
        let now = self.clock.now();
        engine.end_session(now)?;
        let summary = engine.summary(now)?;
        info!(
            score = summary.score,
            correct = summary.correct_count,
            wrong = summary.wrong_count,
            elapsed_secs = summary.elapsed_seconds,
            "game finished"
        );
        Ok(summary)
    }

    /// # Errors
    ///
    /// Returns `QuizError::NoActiveSession` if no game was started.
    pub fn summary(&self, engine: &QuizEngine) -> Result<GameSummary, GameServiceError> {
        Ok(engine.summary(self.clock.now())?)
    }

    /// Save the game to the leaderboard and drop it from the engine.
    ///
    /// An explicit `name` wins; otherwise the identity's username is used.
    /// On any error the game stays in the engine so the caller can retry.
    ///
    /// # Errors
    ///
    /// Returns `PlayerNameError` for a missing or invalid name,
    /// `QuizError::NoActiveSession` without a game, or `StorageError`.
    pub async fn save_score(
        &self,
        engine: &mut QuizEngine,
        name: Option<&str>,
        identity: Option<&Identity>,
    ) -> Result<LeaderboardEntry, GameServiceError> {
        engine.session()?;
        let name = resolve_name(name, identity)?;

        let summary = self.finish(engine)?;
        let entry = NewLeaderboardEntry::from_summary(
            name,
            &summary,
            self.clock.now(),
            identity.map(|i| i.user_id),
        );
        let stored = self.leaderboard.append_entry(entry).await?;
        engine.take_session();

        info!(
            entry_id = %stored.id,
            score = stored.score,
            difficulty = stored.difficulty.as_code(),
            "score saved"
        );
        Ok(stored)
    }
}

fn resolve_name(
    name: Option<&str>,
    identity: Option<&Identity>,
) -> Result<PlayerName, PlayerNameError> {
    match (name.filter(|n| !n.trim().is_empty()), identity) {
        (Some(raw), _) => PlayerName::parse(raw),
        (None, Some(identity)) => Ok(identity.username.clone()),
        (None, None) => Err(PlayerNameError::Empty),
    }
}

fn log_result(result: &AnswerResult) {
    debug!(
        ticket = %result.ticket,
        correct = result.is_correct,
        timed_out = result.timed_out,
        points = result.points_awarded,
        score = result.new_score,
        "answer evaluated"
    );
    if let Some(difficulty) = result.new_difficulty {
        info!(difficulty = difficulty.as_code(), "difficulty changed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::QuizError;
    use quiz_core::model::UserId;
    use quiz_core::time::fixed_clock;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use storage::repository::InMemoryRepository;

    fn service() -> (GameService, InMemoryRepository) {
        let repo = InMemoryRepository::new();
        (GameService::new(fixed_clock(), Arc::new(repo.clone())), repo)
    }

    fn pending_answer(engine: &QuizEngine) -> i64 {
        engine
            .session()
            .unwrap()
            .current_question()
            .unwrap()
            .expected_answer()
    }

    #[test]
    fn resolve_name_prefers_explicit_name() {
        let identity = Identity {
            user_id: UserId::new(1),
            username: PlayerName::parse("account").unwrap(),
        };
        assert_eq!(
            resolve_name(Some(" typed "), Some(&identity)).unwrap().as_str(),
            "typed"
        );
        assert_eq!(
            resolve_name(Some("   "), Some(&identity)).unwrap().as_str(),
            "account"
        );
        assert_eq!(resolve_name(None, None), Err(PlayerNameError::Empty));
    }

    #[test]
    fn prompt_numbers_follow_answers() {
        let (svc, _) = service();
        let mut engine = QuizEngine::new();
        let mut rng = StdRng::seed_from_u64(3);
        svc.start_game(&mut engine, Difficulty::Easy);

        let first = svc.next_question_with(&mut engine, &mut rng).unwrap();
        assert_eq!(first.number, 1);
        svc.time_out(&mut engine, first.ticket).unwrap();

        let second = svc.next_question_with(&mut engine, &mut rng).unwrap();
        assert_eq!(second.number, 2);
        assert_eq!(second.total, 10);
    }

    #[test]
    fn submit_for_rejects_garbage_without_counting() {
        let (svc, _) = service();
        let mut engine = QuizEngine::new();
        svc.start_game(&mut engine, Difficulty::Medium);
        let prompt = svc.next_question(&mut engine).unwrap();

        let err = svc.submit_for(&mut engine, prompt.ticket, "twelve").unwrap_err();
        assert!(matches!(
            err,
            GameServiceError::Quiz(QuizError::InvalidAnswerInput { .. })
        ));
        assert_eq!(svc.progress(&engine).unwrap().answered, 0);

        let answer = pending_answer(&engine).to_string();
        let result = svc.submit_for(&mut engine, prompt.ticket, &answer).unwrap();
        assert!(result.is_correct);
        // fixed clock: 0 s elapsed, so full time and speed bonus
        assert!(result.points_awarded >= 10 + 10 + 5 + 2);
    }

    #[test]
    fn garbage_after_finish_reports_session_ended() {
        let (svc, _) = service();
        let mut engine = QuizEngine::new();
        svc.start_game(&mut engine, Difficulty::Easy);
        let prompt = svc.next_question(&mut engine).unwrap();
        svc.finish(&mut engine).unwrap();

        let err = svc.submit_for(&mut engine, prompt.ticket, "abc").unwrap_err();
        assert!(matches!(err, GameServiceError::Quiz(QuizError::SessionEnded)));
        let err = svc.submit_answer(&mut engine, "abc").unwrap_err();
        assert!(matches!(err, GameServiceError::Quiz(QuizError::SessionEnded)));
    }

    #[tokio::test]
    async fn save_without_name_keeps_game() {
        let (svc, repo) = service();
        let mut engine = QuizEngine::new();
        svc.start_game(&mut engine, Difficulty::Easy);

        let err = svc.save_score(&mut engine, None, None).await.unwrap_err();
        assert!(matches!(err, GameServiceError::PlayerName(PlayerNameError::Empty)));
        assert!(engine.has_session());
        assert!(repo.all_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_without_game_fails() {
        let (svc, _) = service();
        let mut engine = QuizEngine::new();
        let err = svc.save_score(&mut engine, Some("Ada"), None).await.unwrap_err();
        assert!(matches!(err, GameServiceError::Quiz(QuizError::NoActiveSession)));
    }
}
