use lunchpick_core::db::migrations::latest_version;
use lunchpick_core::db::{open_db, open_db_in_memory, DbError};
use lunchpick_core::{RepoError, SqliteRatingRepository, SqliteRestaurantRepository};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "restaurants");
    assert_table_exists(&conn, "ratings");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lunchpick.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "restaurants");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn failing_migration_is_named_and_rolled_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.db");

    // A pre-existing `ratings` table without `user_email` breaks the cycle index.
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE ratings (id TEXT PRIMARY KEY);")
        .unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::MigrationFailed { version, name, .. } => {
            assert_eq!(version, 2);
            assert_eq!(name, "rating_cycle_index");
        }
        other => panic!("unexpected error: {other}"),
    }

    let conn = Connection::open(&path).unwrap();
    assert_eq!(schema_version(&conn), 0);
    let restaurants_exists: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE name = 'restaurants');",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(restaurants_exists, 0);
}

#[test]
fn rating_requires_existing_restaurant_at_schema_level() {
    let conn = open_db_in_memory().unwrap();

    let err = conn
        .execute(
            "INSERT INTO ratings (id, restaurant_id, user_email, rating, created_at)
             VALUES ('r1', 'missing', 'a@soundthinking.com', 5, 1);",
            [],
        )
        .unwrap_err();
    assert!(err.to_string().contains("FOREIGN KEY"));
}

#[test]
fn restaurant_with_ratings_cannot_be_deleted_directly() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO restaurants (id, name, created_at) VALUES ('x', 'Subway', 1);
         INSERT INTO ratings (id, restaurant_id, user_email, rating, created_at)
         VALUES ('r1', 'x', 'a@soundthinking.com', 5, 2);",
    )
    .unwrap();

    let err = conn
        .execute("DELETE FROM restaurants WHERE id = 'x';", [])
        .unwrap_err();
    assert!(err.to_string().contains("FOREIGN KEY"));
}

#[test]
fn repositories_reject_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let err = SqliteRestaurantRepository::try_new(&conn)
        .err()
        .expect("unmigrated connection must be rejected");
    assert!(matches!(
        err,
        RepoError::UninitializedConnection {
            actual_version: 0,
            ..
        }
    ));
    assert!(SqliteRatingRepository::try_new(&conn).is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
