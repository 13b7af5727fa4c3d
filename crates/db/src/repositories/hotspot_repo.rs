//! Repository for the `hotspots` table.

use sqlx::{PgConnection, PgPool};
use vrtour_core::types::DbId;
use vrtour_core::validation::{DEFAULT_HOTSPOT_COLOR, DEFAULT_HOTSPOT_SIZE};

use crate::models::hotspot::{CreateHotspot, Hotspot, HotspotWithTarget, UpdateHotspot};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, source_scene_id, target_scene_id, yaw, pitch, label, size, color, \
    is_active, created_at, updated_at";

/// Hotspot columns joined with the target scene title (`h` / `ts` aliases).
const WITH_TARGET_COLUMNS: &str = "h.id, h.source_scene_id, h.target_scene_id, h.yaw, h.pitch, \
    h.label, h.size, h.color, h.is_active, h.created_at, h.updated_at, \
    ts.title AS target_scene_title";

/// Provides CRUD operations and read projections for hotspots.
pub struct HotspotRepo;

impl HotspotRepo {
    /// Insert a new hotspot inside the caller's transaction.
    ///
    /// `label` defaults to empty text, `size` to 1.0, `color` to `#ffffff`
    /// and `is_active` to `true`.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateHotspot,
    ) -> Result<Hotspot, sqlx::Error> {
        let query = format!(
            "INSERT INTO hotspots
                (source_scene_id, target_scene_id, yaw, pitch, label, size, color, is_active)
             VALUES ($1, $2, $3, $4, COALESCE($5, ''), COALESCE($6, $9), COALESCE($7, $10),
                     COALESCE($8, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Hotspot>(&query)
            .bind(input.source_scene)
            .bind(input.target_scene)
            .bind(input.yaw)
            .bind(input.pitch)
            .bind(&input.label)
            .bind(input.size)
            .bind(&input.color)
            .bind(input.is_active)
            .bind(DEFAULT_HOTSPOT_SIZE)
            .bind(DEFAULT_HOTSPOT_COLOR)
            .fetch_one(conn)
            .await
    }

    /// Find a hotspot by ID regardless of its active flag.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Hotspot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hotspots WHERE id = $1");
        sqlx::query_as::<_, Hotspot>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock a hotspot row for the rest of the transaction.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Hotspot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM hotspots WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Hotspot>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Find a hotspot by ID with its target scene title.
    pub async fn find_with_target(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<HotspotWithTarget>, sqlx::Error> {
        let query = format!(
            "SELECT {WITH_TARGET_COLUMNS}
             FROM hotspots h
             JOIN scenes ts ON ts.id = h.target_scene_id
             WHERE h.id = $1"
        );
        sqlx::query_as::<_, HotspotWithTarget>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the active hotspots leaving a scene whose target is active too.
    ///
    /// The source scene and its tour must be active as well; otherwise the
    /// list is empty. Ordered by yaw, then id.
    pub async fn list_active_by_scene(
        pool: &PgPool,
        scene_id: DbId,
    ) -> Result<Vec<HotspotWithTarget>, sqlx::Error> {
        let query = format!(
            "SELECT {WITH_TARGET_COLUMNS}
             FROM hotspots h
             JOIN scenes ss ON ss.id = h.source_scene_id
             JOIN tours t ON t.id = ss.tour_id
             JOIN scenes ts ON ts.id = h.target_scene_id
             WHERE h.source_scene_id = $1
               AND h.is_active AND ss.is_active AND ts.is_active AND t.is_active
             ORDER BY h.yaw ASC, h.id ASC"
        );
        sqlx::query_as::<_, HotspotWithTarget>(&query)
            .bind(scene_id)
            .fetch_all(pool)
            .await
    }

    /// Fetch, in one query, the active hotspots leaving any of `scene_ids`
    /// whose target scene is active. Ordered by source scene, then yaw, then id.
    pub async fn list_active_by_sources(
        pool: &PgPool,
        scene_ids: &[DbId],
    ) -> Result<Vec<HotspotWithTarget>, sqlx::Error> {
        if scene_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {WITH_TARGET_COLUMNS}
             FROM hotspots h
             JOIN scenes ts ON ts.id = h.target_scene_id
             WHERE h.source_scene_id = ANY($1)
               AND h.is_active AND ts.is_active
             ORDER BY h.source_scene_id ASC, h.yaw ASC, h.id ASC"
        );
        sqlx::query_as::<_, HotspotWithTarget>(&query)
            .bind(scene_ids)
            .fetch_all(pool)
            .await
    }

    /// Whether any hotspot starts or ends at the scene.
    pub async fn exists_for_scene(
        conn: &mut PgConnection,
        scene_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS (
                SELECT 1 FROM hotspots
                WHERE source_scene_id = $1 OR target_scene_id = $1
             )",
        )
        .bind(scene_id)
        .fetch_one(conn)
        .await
    }

    /// Update a hotspot inside the caller's transaction. Only non-`None`
    /// fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateHotspot,
    ) -> Result<Option<Hotspot>, sqlx::Error> {
        let query = format!(
            "UPDATE hotspots SET
                source_scene_id = COALESCE($2, source_scene_id),
                target_scene_id = COALESCE($3, target_scene_id),
                yaw = COALESCE($4, yaw),
                pitch = COALESCE($5, pitch),
                label = COALESCE($6, label),
                size = COALESCE($7, size),
                color = COALESCE($8, color),
                is_active = COALESCE($9, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Hotspot>(&query)
            .bind(id)
            .bind(input.source_scene)
            .bind(input.target_scene)
            .bind(input.yaw)
            .bind(input.pitch)
            .bind(&input.label)
            .bind(input.size)
            .bind(&input.color)
            .bind(input.is_active)
            .fetch_optional(conn)
            .await
    }

    /// Permanently delete a hotspot. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM hotspots WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
