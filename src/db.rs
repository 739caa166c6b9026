use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{debug, info, instrument};

/// Statements run at startup; every one is idempotent.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS jobs (
        id TEXT PRIMARY KEY,
        seq BIGSERIAL NOT NULL,
        applicants BIGINT NOT NULL DEFAULT 0,
        doc JSONB NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS jobs_seq_idx ON jobs (seq)",
    "CREATE INDEX IF NOT EXISTS jobs_owner_idx ON jobs ((doc -> 'buyer' ->> 'email'))",
    "CREATE TABLE IF NOT EXISTS applications (
        id TEXT PRIMARY KEY,
        seq BIGSERIAL NOT NULL,
        job_id TEXT NOT NULL,
        email TEXT NOT NULL,
        job_category TEXT,
        doc JSONB NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS applications_seq_idx ON applications (seq)",
    "CREATE INDEX IF NOT EXISTS applications_email_idx ON applications (email)",
    "CREATE INDEX IF NOT EXISTS applications_category_idx ON applications (job_category)",
];

/// Opens the connection pool
#[instrument(skip(database_url))]
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    info!("Connected to database");
    Ok(pool)
}

/// Creates the document tables if they do not exist yet
#[instrument(skip(pool))]
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for statement in SCHEMA {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;

    debug!(statements = SCHEMA.len(), "Schema ensured");
    Ok(())
}
