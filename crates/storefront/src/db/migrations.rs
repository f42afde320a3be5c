//! Forward-only migration ledger.
//!
//! The schema converges through an ordered list of recorded steps instead
//! of runtime table introspection. Each step runs in one transaction that
//! first claims its row in `schema_migrations`; if the claim inserts zero
//! rows another writer already applied (or is applying) the step, so it is
//! skipped. That makes [`ensure_schema`] safe to call repeatedly and from
//! concurrent processes.
//!
//! Steps are additive only - no drops, no renames, no type changes - so a
//! database produced by an older binary converges under a newer one. The
//! sequence replays the layout history of the original data files: later
//! columns (`purchases.paid`, `purchase_items.price`) land as `ALTER TABLE`
//! steps on top of the base tables.

use chrono::Utc;
use sqlx::SqlitePool;

use super::RepositoryError;

/// A single schema migration step.
struct Migration {
    /// Monotonically increasing version, recorded once applied.
    version: i64,
    /// Human-readable step name for the ledger and logs.
    name: &'static str,
    /// DDL to execute; may contain multiple statements.
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "base catalog and customers",
        sql: "
            CREATE TABLE IF NOT EXISTS games (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                price INTEGER NOT NULL,
                image_url TEXT NOT NULL DEFAULT ''
            );
            CREATE TABLE IF NOT EXISTS customers (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        ",
    },
    Migration {
        version: 2,
        name: "order ledger",
        sql: "
            CREATE TABLE IF NOT EXISTS purchases (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES customers(id),
                total INTEGER NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE TABLE IF NOT EXISTS purchase_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                purchase_id INTEGER NOT NULL REFERENCES purchases(id),
                game_id INTEGER NOT NULL REFERENCES games(id),
                quantity INTEGER NOT NULL DEFAULT 1
            );
        ",
    },
    Migration {
        version: 3,
        name: "server-side carts",
        sql: "
            CREATE TABLE IF NOT EXISTS cart_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES customers(id),
                game_id INTEGER NOT NULL REFERENCES games(id),
                quantity INTEGER NOT NULL DEFAULT 1
            );
            CREATE UNIQUE INDEX IF NOT EXISTS idx_cart_items_user_game
                ON cart_items(user_id, game_id);
        ",
    },
    Migration {
        version: 4,
        name: "paid flag and price snapshots",
        sql: "
            ALTER TABLE purchases ADD COLUMN paid INTEGER NOT NULL DEFAULT 0;
            ALTER TABLE purchase_items ADD COLUMN price INTEGER NOT NULL DEFAULT 0;
        ",
    },
    Migration {
        version: 5,
        name: "library entitlements",
        sql: "
            CREATE TABLE IF NOT EXISTS user_games (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES customers(id),
                game_id INTEGER NOT NULL REFERENCES games(id),
                UNIQUE(user_id, game_id)
            );
        ",
    },
    Migration {
        version: 6,
        name: "game comments",
        sql: "
            CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                game_id INTEGER NOT NULL REFERENCES games(id),
                user_id INTEGER NOT NULL REFERENCES customers(id),
                rating INTEGER NOT NULL,
                body TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
        ",
    },
];

/// Converge the database toward the current schema.
///
/// Applies every unapplied migration in version order. Call once at
/// startup; calling again is a no-op.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the ledger table cannot be
/// created or a step fails. A failed step is rolled back and left
/// unrecorded, so a later call retries it; the caller may choose to
/// continue in a degraded state where individual queries against missing
/// structures fail on their own.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), RepositoryError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await?;

    for migration in MIGRATIONS {
        let mut tx = pool.begin().await?;

        // Claim the version row; zero rows affected means another writer
        // already holds this step.
        let claimed = sqlx::query(
            "INSERT INTO schema_migrations (version, name, applied_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(version) DO NOTHING",
        )
        .bind(migration.version)
        .bind(migration.name)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if claimed == 0 {
            tx.rollback().await?;
            continue;
        }

        sqlx::raw_sql(migration.sql).execute(&mut *tx).await?;
        tx.commit().await?;

        tracing::info!(
            version = migration.version,
            name = migration.name,
            "applied schema migration"
        );
    }

    Ok(())
}

/// List the versions recorded in the ledger, in order.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn applied_versions(pool: &SqlitePool) -> Result<Vec<i64>, RepositoryError> {
    let versions = sqlx::query_scalar("SELECT version FROM schema_migrations ORDER BY version")
        .fetch_all(pool)
        .await?;
    Ok(versions)
}

#[cfg(test)]
mod tests {
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;

    async fn memory_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("in-memory pool")
    }

    #[tokio::test]
    async fn test_ensure_schema_applies_all_steps() {
        let pool = memory_pool().await;
        ensure_schema(&pool).await.expect("bootstrap");

        let versions = applied_versions(&pool).await.expect("versions");
        let expected: Vec<i64> = MIGRATIONS.iter().map(|m| m.version).collect();
        assert_eq!(versions, expected);

        // Spot-check a late additive column.
        sqlx::query("SELECT paid FROM purchases")
            .fetch_all(&pool)
            .await
            .expect("paid column exists");
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let pool = memory_pool().await;
        ensure_schema(&pool).await.expect("first run");
        ensure_schema(&pool).await.expect("second run");
        ensure_schema(&pool).await.expect("third run");

        let versions = applied_versions(&pool).await.expect("versions");
        assert_eq!(versions.len(), MIGRATIONS.len());
    }

    #[tokio::test]
    async fn test_versions_strictly_increase() {
        let mut last = 0;
        for m in MIGRATIONS {
            assert!(m.version > last, "{} out of order", m.name);
            last = m.version;
        }
    }
}
