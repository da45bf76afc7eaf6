// Copyright 2023 Remi Bernotavicius

use diesel::prelude::Connection as _;
use diesel::RunQueryDsl as _;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::error::Error;
use std::path::Path;

pub mod models;
pub mod schema;

pub type Connection = diesel::sqlite::SqliteConnection;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

type ConnectionResult = Result<Connection, Box<dyn Error + Send + Sync + 'static>>;

fn prepare(mut connection: Connection) -> ConnectionResult {
    // Off by default in SQLite.
    diesel::sql_query("PRAGMA foreign_keys = ON").execute(&mut connection)?;
    let applied = connection.run_pending_migrations(MIGRATIONS)?;
    if !applied.is_empty() {
        log::info!("applied {} database migration(s)", applied.len());
    }
    Ok(connection)
}

pub fn establish_connection(path: impl AsRef<Path>) -> ConnectionResult {
    let path = path.as_ref();
    let url = path
        .to_str()
        .ok_or_else(|| format!("database path {path:?} is not valid UTF-8"))?;
    log::debug!("opening database at {url}");
    prepare(Connection::establish(url)?)
}

#[cfg(test)]
pub fn establish_in_memory_connection() -> Connection {
    prepare(Connection::establish(":memory:").unwrap()).unwrap()
}

#[test]
fn migrations() {
    let mut conn = establish_in_memory_connection();

    conn.revert_all_migrations(MIGRATIONS).unwrap();
    let applied = conn.run_pending_migrations(MIGRATIONS).unwrap();
    assert_eq!(applied.len(), 1);
    assert!(!conn.has_pending_migration(MIGRATIONS).unwrap());
}

#[test]
fn foreign_keys_enabled() {
    use diesel::sql_types::Integer;

    #[derive(diesel::QueryableByName)]
    struct Pragma {
        #[diesel(sql_type = Integer)]
        foreign_keys: i32,
    }

    let mut conn = establish_in_memory_connection();
    let pragma: Pragma = diesel::sql_query("PRAGMA foreign_keys")
        .get_result(&mut conn)
        .unwrap();
    assert_eq!(pragma.foreign_keys, 1);
}
