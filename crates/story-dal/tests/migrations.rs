use story_dal::{MigrationDirection, migrate, migrate_steps, new_pool};

async fn table_exists(pool: &story_dal::Pool, name: &str) -> bool {
    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)")
        .bind(name)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_migrate_up_and_down() {
    let dir = tempfile::tempdir().unwrap();
    let db_url = format!("sqlite://{}/stories.db", dir.path().display());
    let pool = new_pool(&db_url).await.unwrap();

    let applied = migrate_steps(&pool, MigrationDirection::Up, 1).await.unwrap();
    assert_eq!(applied, 1);
    assert!(table_exists(&pool, "categories").await);
    assert!(!table_exists(&pool, "stories").await);

    let applied = migrate_steps(&pool, MigrationDirection::Up, 10).await.unwrap();
    assert_eq!(applied, 1);
    assert!(table_exists(&pool, "stories").await);

    let applied = migrate_steps(&pool, MigrationDirection::Up, 1).await.unwrap();
    assert_eq!(applied, 0);

    let reverted = migrate_steps(&pool, MigrationDirection::Down, 1).await.unwrap();
    assert_eq!(reverted, 1);
    assert!(!table_exists(&pool, "stories").await);
    assert!(table_exists(&pool, "categories").await);

    let reverted = migrate_steps(&pool, MigrationDirection::Down, 10).await.unwrap();
    assert_eq!(reverted, 1);
    assert!(!table_exists(&pool, "categories").await);

    let reverted = migrate_steps(&pool, MigrationDirection::Down, 1).await.unwrap();
    assert_eq!(reverted, 0);

    // full startup migration works on rolled back database
    migrate(&pool).await.unwrap();
    assert!(table_exists(&pool, "categories").await);
    assert!(table_exists(&pool, "stories").await);
}

#[tokio::test]
async fn test_rollback_after_startup_migration() {
    let dir = tempfile::tempdir().unwrap();
    let db_url = format!("sqlite://{}/stories.db", dir.path().display());
    let pool = new_pool(&db_url).await.unwrap();
    migrate(&pool).await.unwrap();

    sqlx::query("INSERT INTO categories (name) VALUES ('Fiction')")
        .execute(&pool)
        .await
        .unwrap();

    let reverted = migrate_steps(&pool, MigrationDirection::Down, 2).await.unwrap();
    assert_eq!(reverted, 2);
    assert!(!table_exists(&pool, "categories").await);
}
