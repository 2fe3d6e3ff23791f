use std::sync::Arc;

use async_trait::async_trait;
use quiz_core::model::{
    Difficulty, LeaderboardEntry, NewLeaderboardEntry, UserId,
};
use quiz_core::time::fixed_clock;
use quiz_core::{QuizEngine, QuizError};
use rand::SeedableRng;
use rand::rngs::StdRng;
use services::{AppServices, GameServiceError};
use storage::repository::{LeaderboardRepository, StorageError};

fn pending_answer(engine: &QuizEngine) -> String {
    engine
        .session()
        .unwrap()
        .current_question()
        .unwrap()
        .expected_answer()
        .to_string()
}

#[tokio::test]
async fn perfect_game_is_saved_and_ranked() {
    let app = AppServices::in_memory(fixed_clock());
    let game = app.game();
    let mut engine = QuizEngine::new();
    let mut rng = StdRng::seed_from_u64(42);

    game.start_game(&mut engine, Difficulty::Easy);
    let mut changes = Vec::new();
    while !game.progress(&engine).unwrap().is_game_over {
        let prompt = game.next_question_with(&mut engine, &mut rng).unwrap();
        let answer = pending_answer(&engine);
        let result = game.submit_for(&mut engine, prompt.ticket, &answer).unwrap();
        assert!(result.is_correct);
        changes.extend(result.new_difficulty);
    }
    assert_eq!(changes, [Difficulty::Medium, Difficulty::Hard]);

    let err = game.next_question_with(&mut engine, &mut rng).unwrap_err();
    assert!(matches!(err, GameServiceError::Quiz(QuizError::GameOver)));

    let summary = game.summary(&engine).unwrap();
    assert_eq!(summary.correct_count, 10);
    assert_eq!(summary.wrong_count, 0);
    assert_eq!(summary.highest_difficulty, Difficulty::Hard);

    let saved = game.save_score(&mut engine, Some("Ada"), None).await.unwrap();
    assert_eq!(saved.score, summary.score);
    assert_eq!(saved.difficulty, Difficulty::Hard);
    assert!(!engine.has_session());

    let top = app.leaderboard().top().await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].rank, 1);
    assert_eq!(top[0].name, "Ada");
    assert!(!top[0].is_registered);
}

#[tokio::test]
async fn timeouts_downgrade_and_registered_save_uses_username() {
    let app = AppServices::in_memory(fixed_clock());
    let game = app.game();
    let identity = app.accounts().register("grace").await.unwrap();
    let mut engine = QuizEngine::new();
    let mut rng = StdRng::seed_from_u64(7);

    game.start_game(&mut engine, Difficulty::Hard);
    let mut last = None;
    for _ in 0..3 {
        let prompt = game.next_question_with(&mut engine, &mut rng).unwrap();
        last = Some(game.time_out(&mut engine, prompt.ticket).unwrap());
    }
    let last = last.unwrap();
    assert!(last.timed_out);
    assert_eq!(last.new_difficulty, Some(Difficulty::Medium));
    assert_eq!(last.new_score, 0);

    // a late answer for an already-timed-out question is refused
    let stale = game.submit_for(&mut engine, last.ticket, "1").unwrap_err();
    assert!(matches!(
        stale,
        GameServiceError::Quiz(QuizError::NoActiveQuestion | QuizError::StaleQuestion { .. })
    ));

    let saved = game
        .save_score(&mut engine, None, Some(&identity))
        .await
        .unwrap();
    assert_eq!(saved.name.as_str(), "grace");
    assert_eq!(saved.owner, Some(identity.user_id));
    assert_eq!(saved.difficulty, Difficulty::Hard);

    let mine = app
        .leaderboard()
        .for_player(&identity, 5)
        .await
        .unwrap();
    assert_eq!(mine.len(), 1);
    assert!(mine[0].is_registered);
}

struct OfflineLeaderboard;

#[async_trait]
impl LeaderboardRepository for OfflineLeaderboard {
    async fn append_entry(
        &self,
        _entry: NewLeaderboardEntry,
    ) -> Result<LeaderboardEntry, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn top_entries(&self, _limit: u32) -> Result<Vec<LeaderboardEntry>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn all_entries(&self) -> Result<Vec<LeaderboardEntry>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn entries_for_owner(
        &self,
        _owner: UserId,
        _limit: u32,
    ) -> Result<Vec<LeaderboardEntry>, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }

    async fn clear(&self) -> Result<u64, StorageError> {
        Err(StorageError::Connection("offline".into()))
    }
}

#[tokio::test]
async fn failed_save_keeps_the_game_for_retry() {
    let game = services::GameService::new(fixed_clock(), Arc::new(OfflineLeaderboard));
    let mut engine = QuizEngine::new();
    game.start_game(&mut engine, Difficulty::Easy);

    let err = game.save_score(&mut engine, Some("Ada"), None).await.unwrap_err();
    assert!(matches!(err, GameServiceError::Storage(StorageError::Connection(_))));
    assert!(engine.has_session());
    assert!(engine.session().unwrap().is_ended());
}
