//! Database schema management for the telemetry store.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs`, only when a database is configured.

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates the `sensor_readings` table holding one row per plant reading.
/// Safe to call on every startup; no-op if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sensor_readings (
            id           SERIAL PRIMARY KEY,
            plant_id     UUID             NOT NULL,
            moisture     DOUBLE PRECISION,
            temperature  DOUBLE PRECISION,
            recorded_at  TIMESTAMPTZ      NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Latest-reading lookups are per plant, newest first
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_sensor_readings_plant_time
            ON sensor_readings (plant_id, recorded_at DESC);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
