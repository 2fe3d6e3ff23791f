use chrono::Duration;
use quiz_core::model::{Difficulty, NewLeaderboardEntry, PlayerName, UserId};
use quiz_core::time::fixed_now;
use storage::repository::{LeaderboardRepository, StorageError, UserRepository};
use storage::sqlite::SqliteRepository;

fn submission(name: &str, score: u32, owner: Option<UserId>) -> NewLeaderboardEntry {
    NewLeaderboardEntry {
        name: PlayerName::parse(name).unwrap(),
        score,
        difficulty: Difficulty::Hard,
        recorded_at: fixed_now(),
        owner,
    }
}

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_leaderboard_orders_by_score_then_arrival() {
    let repo = connect("memdb_leaderboard_order").await;

    for (name, score) in [("amy", 40), ("ben", 75), ("cal", 40), ("dee", 75), ("eve", 12), ("fay", 3)] {
        repo.append_entry(submission(name, score, None)).await.unwrap();
    }

    let top = repo.top_entries(5).await.expect("top");
    let names: Vec<&str> = top.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, ["ben", "dee", "amy", "cal", "eve"]);

    let all = repo.all_entries().await.expect("all");
    assert_eq!(all.len(), 6);
    assert_eq!(all[5].name.as_str(), "fay");
}

#[tokio::test]
async fn sqlite_roundtrip_preserves_entry_fields() {
    let repo = connect("memdb_leaderboard_roundtrip").await;
    let user = repo
        .create_user(&PlayerName::parse("ada").unwrap(), fixed_now())
        .await
        .unwrap();

    let mut new = submission("Ada Lovelace", 128, Some(user.id));
    new.recorded_at = fixed_now() + Duration::milliseconds(250);
    let stored = repo.append_entry(new.clone()).await.unwrap();
    assert_eq!(stored.name, new.name);

    let fetched = repo.entries_for_owner(user.id, 5).await.unwrap();
    assert_eq!(fetched.len(), 1);
    assert_eq!(fetched[0], stored);
    assert_eq!(fetched[0].difficulty, Difficulty::Hard);
    assert_eq!(fetched[0].recorded_at, new.recorded_at);
    assert_eq!(fetched[0].owner, Some(user.id));
}

#[tokio::test]
async fn sqlite_users_are_unique_and_clear_keeps_accounts() {
    let repo = connect("memdb_users").await;
    let name = PlayerName::parse("grace").unwrap();
    let user = repo.create_user(&name, fixed_now()).await.unwrap();

    assert!(matches!(
        repo.create_user(&name, fixed_now()).await,
        Err(StorageError::Conflict)
    ));
    assert_eq!(repo.get_user(user.id).await.unwrap(), Some(user.clone()));
    assert_eq!(
        repo.get_user_by_username("grace").await.unwrap(),
        Some(user.clone())
    );
    assert_eq!(repo.get_user(UserId::new(999)).await.unwrap(), None);

    repo.append_entry(submission("grace", 10, Some(user.id))).await.unwrap();
    assert_eq!(repo.clear().await.unwrap(), 1);
    assert!(repo.top_entries(5).await.unwrap().is_empty());
    assert!(repo.get_user(user.id).await.unwrap().is_some());
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    repo.append_entry(submission("x", 1, None)).await.unwrap();
    assert_eq!(repo.all_entries().await.unwrap().len(), 1);
}
