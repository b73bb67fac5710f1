use chrono::Duration;
use lesson_core::model::{LessonCatalog, LessonId, LessonProgress, UserProgress};
use lesson_core::sync::default_progress;
use lesson_core::time::fixed_now;
use sqlx::Row;
use storage::repository::{ProgressRecordRepository, StorageError};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

#[tokio::test]
async fn sqlite_roundtrip_persists_progress_record() {
    let repo = connect("memdb_progress_roundtrip").await;
    let catalog = LessonCatalog::thai_starter();
    let mut progress = default_progress(&catalog);
    progress.record_item_completion("consonants1", "ก", 0);
    progress.record_item_completion("consonants1", "ข", 1);
    progress.award_score(&catalog, "consonants1", 10);

    assert!(repo.get_progress("key").await.unwrap().is_none());
    repo.save_progress("key", &progress, fixed_now()).await.unwrap();

    let fetched = repo.get_progress("key").await.unwrap().expect("stored");
    assert_eq!(fetched, progress);
    let lesson = fetched.get("consonants1").unwrap();
    assert_eq!(lesson.completed_count(), 2);
    assert_eq!(lesson.score(), 10);
    assert_eq!(lesson.last_item_index(), 1);
}

#[tokio::test]
async fn sqlite_save_overwrites_and_delete_removes() {
    let repo = connect("memdb_progress_overwrite").await;
    let mut first = UserProgress::new();
    first.insert(LessonId::new("a"), LessonProgress::fresh(1, true));
    let mut second = first.clone();
    second.insert(LessonId::new("b"), LessonProgress::fresh(2, false));

    repo.save_progress("key", &first, fixed_now()).await.unwrap();
    repo.save_progress("key", &second, fixed_now() + Duration::minutes(1))
        .await
        .unwrap();
    assert_eq!(repo.get_progress("key").await.unwrap(), Some(second));

    let count: i64 = sqlx::query("SELECT COUNT(*) AS n FROM progress_records")
        .fetch_one(repo.pool())
        .await
        .unwrap()
        .get("n");
    assert_eq!(count, 1);

    repo.delete_progress("key").await.unwrap();
    assert!(repo.get_progress("key").await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_corrupt_record_surfaces_serialization_error() {
    let repo = connect("memdb_progress_corrupt").await;
    sqlx::query("INSERT INTO progress_records (key, value, updated_at) VALUES (?1, ?2, ?3)")
        .bind("key")
        .bind("[1, 2")
        .bind(fixed_now())
        .execute(repo.pool())
        .await
        .unwrap();

    let err = repo.get_progress("key").await.unwrap_err();
    assert!(matches!(err, StorageError::Serialization(_)));
}

#[tokio::test]
async fn sqlite_migrate_is_repeatable() {
    let repo = connect("memdb_progress_migrate").await;
    repo.migrate().await.expect("second migrate");
    let versions: i64 = sqlx::query("SELECT COUNT(*) AS n FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap()
        .get("n");
    assert_eq!(versions, 1);
}
