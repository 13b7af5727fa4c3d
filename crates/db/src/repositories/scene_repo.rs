//! Repository for the `scenes` table.

use sqlx::{PgConnection, PgPool};
use vrtour_core::types::DbId;

use crate::models::scene::{
    CreateScene, Scene, SceneDetailRow, SceneMedia, SceneMediaUpdate, SceneTourRef,
    SceneWithStats, UpdateScene,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, tour_id, title, description, panorama_image, voiceover_audio, \
    map_image, initial_yaw, initial_pitch, sort_order, is_active, created_at, updated_at";

/// Same columns, qualified with the `s` alias for joined queries.
const S_COLUMNS: &str = "s.id, s.tour_id, s.title, s.description, s.panorama_image, \
    s.voiceover_audio, s.map_image, s.initial_yaw, s.initial_pitch, s.sort_order, \
    s.is_active, s.created_at, s.updated_at";

/// Live count of hotspots sourced from `s`.
const HOTSPOT_COUNT: &str =
    "(SELECT COUNT(*) FROM hotspots h WHERE h.source_scene_id = s.id) AS hotspot_count";

fn detail_select() -> String {
    format!(
        "SELECT {S_COLUMNS}, t.title AS tour_title, {HOTSPOT_COUNT} \
         FROM scenes s JOIN tours t ON t.id = s.tour_id"
    )
}

/// Provides CRUD operations and read projections for scenes.
pub struct SceneRepo;

impl SceneRepo {
    /// Insert a new scene, returning the created row.
    ///
    /// Camera angles and order default to 0, `is_active` to `true`.
    /// A duplicate `(tour, order)` pair fails with the
    /// `uq_scenes_tour_sort_order` unique violation.
    pub async fn create(
        pool: &PgPool,
        input: &CreateScene,
        media: &SceneMedia,
    ) -> Result<Scene, sqlx::Error> {
        let query = format!(
            "INSERT INTO scenes
                (tour_id, title, description, panorama_image, voiceover_audio, map_image,
                 initial_yaw, initial_pitch, sort_order, is_active)
             VALUES ($1, $2, COALESCE($3, ''), $4, $5, $6,
                     COALESCE($7, 0), COALESCE($8, 0), COALESCE($9, 0), COALESCE($10, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scene>(&query)
            .bind(input.tour)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(&media.panorama_image)
            .bind(&media.voiceover_audio)
            .bind(&media.map_image)
            .bind(input.initial_yaw)
            .bind(input.initial_pitch)
            .bind(input.order)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Find a scene by ID regardless of its active flag.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Scene>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scenes WHERE id = $1");
        sqlx::query_as::<_, Scene>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lock a scene row for the rest of the transaction.
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Scene>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scenes WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Scene>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Resolve the tours of the given scenes and hold a share lock on them
    /// until the transaction ends, so they cannot be deleted or moved while a
    /// hotspot referencing them is written. Missing ids are simply absent.
    pub async fn lock_tour_refs(
        conn: &mut PgConnection,
        ids: &[DbId],
    ) -> Result<Vec<SceneTourRef>, sqlx::Error> {
        sqlx::query_as::<_, SceneTourRef>(
            "SELECT id, tour_id FROM scenes WHERE id = ANY($1) ORDER BY id FOR SHARE",
        )
        .bind(ids)
        .fetch_all(conn)
        .await
    }

    /// List the active scenes of an active tour, ordered by `order`, with
    /// their hotspot counts.
    ///
    /// An unknown or inactive tour yields an empty list.
    pub async fn list_active_by_tour(
        pool: &PgPool,
        tour_id: DbId,
    ) -> Result<Vec<SceneWithStats>, sqlx::Error> {
        let query = format!(
            "SELECT {S_COLUMNS}, {HOTSPOT_COUNT}
             FROM scenes s
             JOIN tours t ON t.id = s.tour_id
             WHERE s.tour_id = $1 AND s.is_active AND t.is_active
             ORDER BY s.sort_order ASC"
        );
        sqlx::query_as::<_, SceneWithStats>(&query)
            .bind(tour_id)
            .fetch_all(pool)
            .await
    }

    /// List the active scenes of a tour, ordered by `order`, without
    /// checking the tour itself.
    pub async fn list_active_rows(pool: &PgPool, tour_id: DbId) -> Result<Vec<Scene>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scenes
             WHERE tour_id = $1 AND is_active
             ORDER BY sort_order ASC"
        );
        sqlx::query_as::<_, Scene>(&query)
            .bind(tour_id)
            .fetch_all(pool)
            .await
    }

    /// Find a scene with its tour title and hotspot count, ignoring the
    /// active flags. Used to render the result of a write.
    pub async fn find_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<SceneDetailRow>, sqlx::Error> {
        let query = format!("{} WHERE s.id = $1", detail_select());
        sqlx::query_as::<_, SceneDetailRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an active scene of an active tour, with its tour title and
    /// hotspot count.
    pub async fn find_active_detail(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<SceneDetailRow>, sqlx::Error> {
        let query = format!(
            "{} WHERE s.id = $1 AND s.is_active AND t.is_active",
            detail_select()
        );
        sqlx::query_as::<_, SceneDetailRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Update a scene inside the caller's transaction. Only non-`None`
    /// fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateScene,
        media: &SceneMediaUpdate,
    ) -> Result<Option<Scene>, sqlx::Error> {
        let query = format!(
            "UPDATE scenes SET
                tour_id = COALESCE($2, tour_id),
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                initial_yaw = COALESCE($5, initial_yaw),
                initial_pitch = COALESCE($6, initial_pitch),
                sort_order = COALESCE($7, sort_order),
                is_active = COALESCE($8, is_active),
                panorama_image = COALESCE($9, panorama_image),
                voiceover_audio = COALESCE($10, voiceover_audio),
                map_image = COALESCE($11, map_image)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scene>(&query)
            .bind(id)
            .bind(input.tour)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.initial_yaw)
            .bind(input.initial_pitch)
            .bind(input.order)
            .bind(input.is_active)
            .bind(&media.panorama_image)
            .bind(&media.voiceover_audio)
            .bind(&media.map_image)
            .fetch_optional(conn)
            .await
    }

    /// Permanently delete a scene, cascading to hotspots on either end.
    ///
    /// Returns the removed row so the caller can release its media.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Scene>, sqlx::Error> {
        let query = format!("DELETE FROM scenes WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Scene>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
