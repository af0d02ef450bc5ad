//! Telemetry store: persisted sensor readings, newest first per plant.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{SensorSnapshot, StoredReading};

// ---

/// Insert one reading taken at `recorded_at`.
pub async fn store_reading(
    pool: &PgPool,
    plant_id: Uuid,
    snapshot: &SensorSnapshot,
    recorded_at: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    // ---
    sqlx::query(
        r#"
        INSERT INTO sensor_readings (plant_id, moisture, temperature, recorded_at)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(plant_id)
    .bind(snapshot.moisture)
    .bind(snapshot.temperature)
    .bind(recorded_at)
    .execute(pool)
    .await?;

    Ok(())
}

/// Most recent reading stored for the plant, if any.
pub async fn latest_reading(pool: &PgPool, plant_id: Uuid) -> Result<Option<StoredReading>, sqlx::Error> {
    // ---
    sqlx::query_as::<_, StoredReading>(
        r#"
        SELECT plant_id, moisture, temperature, recorded_at
        FROM sensor_readings
        WHERE plant_id = $1
        ORDER BY recorded_at DESC
        LIMIT 1
        "#,
    )
    .bind(plant_id)
    .fetch_optional(pool)
    .await
}
