use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::SqliteConnection;
use tracing::{trace, trace_span};

use crate::{config::DatabaseConfig, database::migrations, error::Result};

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;
pub type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Per-connection pragmas, applied each time the pool opens a connection.
#[derive(Debug, Clone, Copy)]
struct ConnectionOptions {
    busy_timeout: Duration,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_secs(5),
        }
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(
        &self,
        connection: &mut SqliteConnection,
    ) -> std::result::Result<(), diesel::r2d2::Error> {
        // foreign_keys is off by default in SQLite, the link table cascades rely on it
        connection
            .batch_execute(&format!(
                "PRAGMA busy_timeout = {}; PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;",
                self.busy_timeout.as_millis()
            ))
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn establish_pooled_connection(config: &DatabaseConfig) -> Result<DbPool> {
    let span = trace_span!("establishing pooled connection");
    let _guard = span.enter();

    trace!(database_url = %config.database_url, "Creating manager");
    let manager = ConnectionManager::<SqliteConnection>::new(&config.database_url);

    trace!(max_size = config.pool_size, "Creating pool");
    let pool = Pool::builder()
        .max_size(config.pool_size)
        .connection_customizer(Box::new(ConnectionOptions::default()))
        .build(manager)?;

    let mut connection = pool.get()?;
    let applied = migrations::run(&mut connection)?;
    trace!(applied, "Applied migrations");

    Ok(pool)
}

/// A migrated in-memory database. Every connection to `:memory:` is its own
/// database, so the pool holds exactly one.
#[cfg(test)]
pub fn establish_test_pool() -> DbPool {
    let config = DatabaseConfig {
        database_url: ":memory:".to_owned(),
        pool_size: 1,
    };

    establish_pooled_connection(&config).expect("Failed to create test pool")
}
