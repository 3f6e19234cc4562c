use diesel::connection::SimpleConnection;
use diesel::dsl::exists;
use diesel::prelude::*;
use tracing::{debug, info};

/// Schema migrations in the order they apply, keyed by their directory name.
const MIGRATIONS: &[(&str, &str)] = &[(
    "2024-05-12-081500_create_recipes",
    include_str!("../../migrations/2024-05-12-081500_create_recipes/up.sql"),
)];

diesel::table! {
    schema_migrations (version) {
        version -> Text,
    }
}

/// Applies every migration not yet recorded in `schema_migrations` and
/// returns how many ran. Each one commits together with its version row.
pub fn run(connection: &mut SqliteConnection) -> QueryResult<usize> {
    connection.batch_execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version VARCHAR(50) PRIMARY KEY NOT NULL,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        );",
    )?;

    let mut applied = 0;
    for &(version, sql) in MIGRATIONS {
        let ran = connection.immediate_transaction(|connection| {
            let done = diesel::select(exists(schema_migrations::table.find(version)))
                .get_result::<bool>(connection)?;
            if done {
                return Ok::<_, diesel::result::Error>(false);
            }

            debug!(version, "Applying migration");
            connection.batch_execute(sql)?;
            diesel::insert_into(schema_migrations::table)
                .values(schema_migrations::version.eq(version))
                .execute(connection)?;

            Ok(true)
        })?;

        if ran {
            info!(version, "Applied migration");
            applied += 1;
        }
    }

    Ok(applied)
}
