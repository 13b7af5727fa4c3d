//! Repository for the `tours` table.

use sqlx::{PgPool, Postgres, QueryBuilder};
use vrtour_core::tour_query::{TourOrdering, TourSortField, DEFAULT_TOUR_ORDERING};
use vrtour_core::types::DbId;

use crate::models::tour::{CreateTour, Tour, TourListQuery, TourWithStats, UpdateTour};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, thumbnail, is_active, created_at, updated_at";

/// Tour columns plus the live scene count and first active scene, computed
/// in the same statement so listing never issues a query per tour.
const STATS_COLUMNS: &str = "t.id, t.title, t.description, t.thumbnail, t.is_active, \
    t.created_at, t.updated_at, \
    (SELECT COUNT(*) FROM scenes s WHERE s.tour_id = t.id) AS scene_count, \
    (SELECT s.id FROM scenes s WHERE s.tour_id = t.id AND s.is_active \
     ORDER BY s.sort_order ASC LIMIT 1) AS first_scene_id";

/// Provides CRUD operations and read projections for tours.
pub struct TourRepo;

impl TourRepo {
    /// Insert a new tour, returning the created row.
    ///
    /// `description` defaults to empty text and `is_active` to `true`.
    pub async fn create(pool: &PgPool, input: &CreateTour) -> Result<Tour, sqlx::Error> {
        let query = format!(
            "INSERT INTO tours (title, description, is_active)
             VALUES ($1, COALESCE($2, ''), COALESCE($3, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tour>(&query)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
    }

    /// Find a tour by ID regardless of its active flag.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Tour>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tours WHERE id = $1");
        sqlx::query_as::<_, Tour>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an active tour by ID.
    pub async fn find_active(pool: &PgPool, id: DbId) -> Result<Option<Tour>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tours WHERE id = $1 AND is_active");
        sqlx::query_as::<_, Tour>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a tour by ID together with its derived values, active or not.
    pub async fn find_with_stats(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TourWithStats>, sqlx::Error> {
        let query = format!("SELECT {STATS_COLUMNS} FROM tours t WHERE t.id = $1");
        sqlx::query_as::<_, TourWithStats>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find an active tour by ID together with its derived values.
    pub async fn find_active_with_stats(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<TourWithStats>, sqlx::Error> {
        let query = format!("SELECT {STATS_COLUMNS} FROM tours t WHERE t.id = $1 AND t.is_active");
        sqlx::query_as::<_, TourWithStats>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List active tours with their derived values.
    ///
    /// Every search pattern must match the title or the description
    /// (case-insensitive). Ties in the requested ordering fall back to id.
    pub async fn list_active(
        pool: &PgPool,
        params: &TourListQuery,
    ) -> Result<Vec<TourWithStats>, sqlx::Error> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
        qb.push(STATS_COLUMNS);
        qb.push(" FROM tours t WHERE t.is_active");

        for pattern in &params.search {
            qb.push(" AND (t.title ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" OR t.description ILIKE ");
            qb.push_bind(pattern.clone());
            qb.push(")");
        }

        qb.push(" ORDER BY ");
        qb.push(order_clause(&params.ordering));

        qb.build_query_as::<TourWithStats>().fetch_all(pool).await
    }

    /// Update a tour. Only non-`None` fields in `input` are applied.
    ///
    /// Inactive tours can be updated (and reactivated). Returns `None` if no
    /// row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTour,
    ) -> Result<Option<Tour>, sqlx::Error> {
        let query = format!(
            "UPDATE tours SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                is_active = COALESCE($4, is_active)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Tour>(&query)
            .bind(id)
            .bind(input.title.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Point the tour at a new thumbnail key.
    ///
    /// Returns the updated row and the key it replaced, or `None` if the
    /// tour does not exist.
    pub async fn replace_thumbnail(
        pool: &PgPool,
        id: DbId,
        key: &str,
    ) -> Result<Option<(Tour, Option<String>)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let previous: Option<(Option<String>,)> =
            sqlx::query_as("SELECT thumbnail FROM tours WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((previous,)) = previous else {
            return Ok(None);
        };

        let query = format!("UPDATE tours SET thumbnail = $2 WHERE id = $1 RETURNING {COLUMNS}");
        let tour = sqlx::query_as::<_, Tour>(&query)
            .bind(id)
            .bind(key)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((tour, previous)))
    }

    /// Permanently delete a tour, cascading to its scenes and their hotspots.
    ///
    /// Returns the storage keys of every media file the deleted rows
    /// referenced, or `None` if the tour does not exist.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Vec<String>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Scene inserts take a key-share lock on their tour, so holding the
        // tour row first means no scene can appear after the keys are read.
        let locked: Option<(DbId,)> =
            sqlx::query_as("SELECT id FROM tours WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            return Ok(None);
        }

        let scene_media: Vec<(String, Option<String>, Option<String>)> = sqlx::query_as(
            "SELECT panorama_image, voiceover_audio, map_image
             FROM scenes WHERE tour_id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let deleted: Option<(Option<String>,)> =
            sqlx::query_as("DELETE FROM tours WHERE id = $1 RETURNING thumbnail")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((thumbnail,)) = deleted else {
            return Ok(None);
        };

        tx.commit().await?;

        let mut keys: Vec<String> = thumbnail.into_iter().collect();
        for (panorama, voiceover, map) in scene_media {
            keys.push(panorama);
            keys.extend(voiceover);
            keys.extend(map);
        }
        Ok(Some(keys))
    }
}

/// Render ordering terms from the allow-list as an `ORDER BY` body.
///
/// Only fixed column names reach the SQL text; user input never does.
fn order_clause(ordering: &[TourOrdering]) -> String {
    let terms = if ordering.is_empty() {
        &[DEFAULT_TOUR_ORDERING][..]
    } else {
        ordering
    };

    let mut parts: Vec<String> = terms
        .iter()
        .map(|term| {
            let column = match term.field {
                TourSortField::Title => "t.title",
                TourSortField::CreatedAt => "t.created_at",
                TourSortField::SceneCount => "scene_count",
            };
            let direction = if term.descending { "DESC" } else { "ASC" };
            format!("{column} {direction}")
        })
        .collect();
    parts.push("t.id DESC".to_string());
    parts.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_order_is_newest_first() {
        assert_eq!(order_clause(&[]), "t.created_at DESC, t.id DESC");
    }

    #[test]
    fn order_terms_map_to_columns() {
        let ordering = vec![
            TourOrdering { field: TourSortField::SceneCount, descending: true },
            TourOrdering { field: TourSortField::Title, descending: false },
        ];
        assert_eq!(order_clause(&ordering), "scene_count DESC, t.title ASC, t.id DESC");
    }
}
