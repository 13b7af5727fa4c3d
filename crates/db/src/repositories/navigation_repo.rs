//! Batched loader for a tour's navigation graph.

use sqlx::PgPool;
use vrtour_core::navigation::{HotspotEdge, SceneNode, TourNode};
use vrtour_core::types::DbId;

use crate::repositories::{HotspotRepo, SceneRepo, TourRepo};

/// Everything needed to assemble one tour's navigation graph.
#[derive(Debug, Clone)]
pub struct NavigationRows {
    pub tour: TourNode,
    pub scenes: Vec<SceneNode>,
    pub hotspots: Vec<HotspotEdge>,
}

/// Loads navigation rows in a fixed number of queries, independent of the
/// number of scenes or hotspots.
pub struct NavigationRepo;

impl NavigationRepo {
    /// Load the active scenes of an active tour and the active hotspots
    /// between them.
    ///
    /// Returns `None` if the tour does not exist or is inactive.
    pub async fn load(pool: &PgPool, tour_id: DbId) -> Result<Option<NavigationRows>, sqlx::Error> {
        let Some(tour) = TourRepo::find_active(pool, tour_id).await? else {
            return Ok(None);
        };

        let scenes = SceneRepo::list_active_rows(pool, tour.id).await?;
        let scene_ids: Vec<DbId> = scenes.iter().map(|s| s.id).collect();
        let hotspots = HotspotRepo::list_active_by_sources(pool, &scene_ids).await?;

        Ok(Some(NavigationRows {
            tour: tour.into(),
            scenes: scenes.into_iter().map(SceneNode::from).collect(),
            hotspots: hotspots.into_iter().map(HotspotEdge::from).collect(),
        }))
    }
}
