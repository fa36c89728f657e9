use async_trait::async_trait;
use adoptindie_core::error::{AdoptError, Result};
use adoptindie_core::models::{GeoPoint, NearbyQuery, NewSighting, SightingId, SightingRecord};
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use super::PostgresStore;
use crate::ports::SightingStore;

const INSERT_SIGHTING: &str = r#"
    INSERT INTO sightings (id, image_url, category, location, age, email, phone, created_at)
    VALUES ($1, $2, $3, ST_SetSRID(ST_MakePoint($4, $5), 4326)::geography, $6, $7, $8, $9)
    RETURNING created_at
"#;

// ST_DWithin/ST_Distance with use_spheroid = false measure on the sphere,
// matching the in-memory Haversine adapter.
const FIND_NEARBY: &str = r#"
    WITH center AS (
        SELECT ST_SetSRID(ST_MakePoint($1, $2), 4326)::geography AS point
    )
    SELECT s.id,
           s.image_url,
           s.category,
           ST_X(s.location::geometry) AS lng,
           ST_Y(s.location::geometry) AS lat,
           s.age,
           s.email,
           s.phone,
           s.created_at
    FROM sightings s, center c
    WHERE ST_DWithin(s.location, c.point, $3, false)
      AND ($4::text IS NULL OR s.category = $4)
    ORDER BY ST_Distance(s.location, c.point, false), s.created_at, s.id
    LIMIT $5
"#;

#[async_trait]
impl SightingStore for PostgresStore {
    async fn insert(&self, sighting: NewSighting) -> Result<SightingRecord> {
        let id = SightingId::generate();
        let [lng, lat] = sighting.location.coordinates();

        // Postgres keeps microseconds; return what was stored
        let created_at: DateTime<Utc> = sqlx::query_scalar(INSERT_SIGHTING)
            .bind(id.0)
            .bind(&sighting.image_url)
            .bind(&sighting.category)
            .bind(lng)
            .bind(lat)
            .bind(&sighting.age)
            .bind(&sighting.email)
            .bind(&sighting.phone)
            .bind(sighting.created_at)
            .fetch_one(self.pool())
            .await
            .map_err(|e| AdoptError::RecordStore(format!("Failed to insert sighting: {}", e)))?;

        Ok(sighting.with_created_at(created_at).into_record(id))
    }

    async fn find_nearby(&self, query: &NearbyQuery) -> Result<Vec<SightingRecord>> {
        let [lng, lat] = query.center.coordinates();
        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);

        let rows = sqlx::query(FIND_NEARBY)
            .bind(lng)
            .bind(lat)
            .bind(query.max_distance_m)
            .bind(query.category.as_deref())
            .bind(limit)
            .fetch_all(self.pool())
            .await
            .map_err(|e| AdoptError::RecordStore(format!("Nearby query failed: {}", e)))?;

        rows.iter().map(row_to_record).collect()
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .fetch_one(self.pool())
            .await
            .map_err(|e| AdoptError::RecordStore(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

fn row_to_record(row: &PgRow) -> Result<SightingRecord> {
    let read_err = |e: sqlx::Error| AdoptError::RecordStore(format!("Malformed sighting row: {}", e));

    let id: Uuid = row.try_get("id").map_err(read_err)?;
    let lng: f64 = row.try_get("lng").map_err(read_err)?;
    let lat: f64 = row.try_get("lat").map_err(read_err)?;

    let location = GeoPoint::new(lng, lat).map_err(|e| {
        AdoptError::RecordStore(format!("Stored location for sighting {} is invalid: {}", id, e))
    })?;

    Ok(SightingRecord {
        id: SightingId(id),
        image_url: row.try_get("image_url").map_err(read_err)?,
        category: row.try_get("category").map_err(read_err)?,
        location,
        age: row.try_get("age").map_err(read_err)?,
        email: row.try_get("email").map_err(read_err)?,
        phone: row.try_get("phone").map_err(read_err)?,
        created_at: row.try_get("created_at").map_err(read_err)?,
    })
}
