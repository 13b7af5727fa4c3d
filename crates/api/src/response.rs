//! Response shapes returned by the handlers.
//!
//! Rows from `vrtour_db` hold storage keys; every shape here resolves them
//! to public URLs through the [`MediaStore`] before serialization.

use serde::Serialize;
use vrtour_core::media::{resolve_url, MediaStore};
use vrtour_core::types::{DbId, SceneOrder, Timestamp};
use vrtour_db::models::hotspot::HotspotWithTarget;
use vrtour_db::models::scene::{Scene, SceneDetailRow, SceneWithStats};
use vrtour_db::models::tour::TourWithStats;

// ---------------------------------------------------------------------------
// Tours
// ---------------------------------------------------------------------------

/// One entry of `GET /api/tours/`.
#[derive(Debug, Serialize)]
pub struct TourListItem {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub scene_count: i64,
    /// Id of the active scene with the lowest order.
    pub first_scene: Option<DbId>,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl TourListItem {
    pub fn new(row: TourWithStats, media: &dyn MediaStore) -> Self {
        let tour = row.tour;
        Self {
            id: tour.id,
            thumbnail: resolve_url(media, tour.thumbnail.as_deref()),
            title: tour.title,
            description: tour.description,
            scene_count: row.scene_count,
            first_scene: row.first_scene_id,
            is_active: tour.is_active,
            created_at: tour.created_at,
        }
    }
}

/// The starting scene of a tour, as embedded in the tour detail.
#[derive(Debug, Serialize)]
pub struct FirstScene {
    pub id: DbId,
    pub title: String,
    pub panorama_image: Option<String>,
}

/// Tour detail with its active scenes.
#[derive(Debug, Serialize)]
pub struct TourDetail {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub thumbnail: Option<String>,
    pub scenes: Vec<SceneListItem>,
    pub scene_count: i64,
    pub first_scene: Option<FirstScene>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TourDetail {
    /// `first_scene` is the row behind `row.first_scene_id`, if any.
    pub fn new(
        row: TourWithStats,
        scenes: Vec<SceneWithStats>,
        first_scene: Option<Scene>,
        media: &dyn MediaStore,
    ) -> Self {
        let tour = row.tour;
        Self {
            id: tour.id,
            thumbnail: resolve_url(media, tour.thumbnail.as_deref()),
            title: tour.title,
            description: tour.description,
            scenes: scenes
                .into_iter()
                .map(|s| SceneListItem::new(s, media))
                .collect(),
            scene_count: row.scene_count,
            first_scene: first_scene.map(|s| FirstScene {
                id: s.id,
                panorama_image: resolve_url(media, Some(&s.panorama_image)),
                title: s.title,
            }),
            is_active: tour.is_active,
            created_at: tour.created_at,
            updated_at: tour.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Scenes
// ---------------------------------------------------------------------------

/// Compact scene shape used in lists and inside the tour detail.
#[derive(Debug, Serialize)]
pub struct SceneListItem {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub panorama_image: Option<String>,
    pub map_image: Option<String>,
    pub order: SceneOrder,
    pub hotspot_count: i64,
    pub is_active: bool,
}

impl SceneListItem {
    pub fn new(row: SceneWithStats, media: &dyn MediaStore) -> Self {
        let scene = row.scene;
        Self {
            id: scene.id,
            panorama_image: resolve_url(media, Some(&scene.panorama_image)),
            map_image: resolve_url(media, scene.map_image.as_deref()),
            title: scene.title,
            description: scene.description,
            order: scene.sort_order,
            hotspot_count: row.hotspot_count,
            is_active: scene.is_active,
        }
    }
}

/// Full scene shape with its active hotspots.
#[derive(Debug, Serialize)]
pub struct SceneDetail {
    pub id: DbId,
    pub tour: DbId,
    pub tour_title: String,
    pub title: String,
    pub description: String,
    pub panorama_image: Option<String>,
    pub voiceover_audio: Option<String>,
    pub initial_yaw: f64,
    pub initial_pitch: f64,
    pub map_image: Option<String>,
    pub order: SceneOrder,
    pub hotspots: Vec<HotspotItem>,
    pub hotspot_count: i64,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SceneDetail {
    pub fn new(
        row: SceneDetailRow,
        hotspots: Vec<HotspotWithTarget>,
        media: &dyn MediaStore,
    ) -> Self {
        let scene = row.scene;
        Self {
            id: scene.id,
            tour: scene.tour_id,
            tour_title: row.tour_title,
            panorama_image: resolve_url(media, Some(&scene.panorama_image)),
            voiceover_audio: resolve_url(media, scene.voiceover_audio.as_deref()),
            map_image: resolve_url(media, scene.map_image.as_deref()),
            title: scene.title,
            description: scene.description,
            initial_yaw: scene.initial_yaw,
            initial_pitch: scene.initial_pitch,
            order: scene.sort_order,
            hotspots: hotspots.into_iter().map(HotspotItem::from).collect(),
            hotspot_count: row.hotspot_count,
            is_active: scene.is_active,
            created_at: scene.created_at,
            updated_at: scene.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Hotspots
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HotspotItem {
    pub id: DbId,
    pub source_scene: DbId,
    pub target_scene: DbId,
    pub target_scene_title: String,
    pub yaw: f64,
    pub pitch: f64,
    pub label: String,
    pub size: f64,
    pub color: String,
    pub is_active: bool,
}

impl From<HotspotWithTarget> for HotspotItem {
    fn from(row: HotspotWithTarget) -> Self {
        let h = row.hotspot;
        Self {
            id: h.id,
            source_scene: h.source_scene_id,
            target_scene: h.target_scene_id,
            target_scene_title: row.target_scene_title,
            yaw: h.yaw,
            pitch: h.pitch,
            label: h.label,
            size: h.size,
            color: h.color,
            is_active: h.is_active,
        }
    }
}
