use anyhow::Result;
use configs::DatabaseConfig;
use migration::MigratorTrait;
use sea_orm::DatabaseConnection;

use crate::db::{connect_with_config, DATABASE_URL};

/// Schema-level guarantees: cascades, restricts and unique indexes
pub mod schema_tests;

/// Transaction handling tests
pub mod transaction_tests;

/// Connect and migrate, or `None` when DB tests are disabled or the database is unreachable.
pub(crate) async fn setup_test_db() -> Result<Option<DatabaseConnection>> {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return Ok(None);
    }
    let cfg = DatabaseConfig { url: DATABASE_URL.clone(), max_connections: 5, ..Default::default() };
    let db = match connect_with_config(&cfg).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("skip: cannot connect to db: {}", e);
            return Ok(None);
        }
    };
    migration::Migrator::up(&db, None).await?;
    Ok(Some(db))
}
