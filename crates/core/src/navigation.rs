//! Navigation graph assembly.
//!
//! Turns the rows of one batched fetch (tour, its active scenes, and the
//! active hotspots between them) into the node/edge payload a viewer renders
//! in a single request.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::media::{resolve_url, MediaStore};
use crate::types::{DbId, SceneOrder};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct TourNode {
    pub id: DbId,
    pub title: String,
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub id: DbId,
    pub title: String,
    pub order: SceneOrder,
    pub initial_yaw: f64,
    pub initial_pitch: f64,
    pub panorama_image: String,
    pub map_image: Option<String>,
    pub voiceover_audio: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HotspotEdge {
    pub id: DbId,
    pub source_scene_id: DbId,
    pub target_scene_id: DbId,
    pub yaw: f64,
    pub pitch: f64,
    pub label: String,
    pub size: f64,
    pub color: String,
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationGraph {
    pub tour: NavigationTour,
    pub scenes: Vec<NavigationScene>,
    pub connections: Vec<Connection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationTour {
    pub id: DbId,
    pub title: String,
    /// Number of scenes in the graph (active scenes only).
    pub scene_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationScene {
    pub id: DbId,
    pub title: String,
    pub order: SceneOrder,
    pub initial_yaw: f64,
    pub initial_pitch: f64,
    pub panorama_image: Option<String>,
    pub map_image: Option<String>,
    pub voiceover_audio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    pub id: DbId,
    pub from_scene: DbId,
    pub to_scene: DbId,
    pub yaw: f64,
    pub pitch: f64,
    pub label: String,
    pub size: f64,
    pub color: String,
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Build the navigation graph of one tour.
///
/// Scenes are emitted by ascending `order`. Connections follow the scene that
/// sources them, and keep their input order within a scene. An edge is only
/// emitted when both of its endpoints are among `scenes`.
pub fn assemble(
    tour: TourNode,
    mut scenes: Vec<SceneNode>,
    hotspots: Vec<HotspotEdge>,
    media: &dyn MediaStore,
) -> NavigationGraph {
    scenes.sort_by_key(|s| s.order);

    let node_ids: HashSet<DbId> = scenes.iter().map(|s| s.id).collect();
    let mut by_source: HashMap<DbId, Vec<HotspotEdge>> = HashMap::new();
    for edge in hotspots {
        if node_ids.contains(&edge.source_scene_id) && node_ids.contains(&edge.target_scene_id) {
            by_source.entry(edge.source_scene_id).or_default().push(edge);
        }
    }

    let mut nodes = Vec::with_capacity(scenes.len());
    let mut connections = Vec::new();

    for scene in scenes {
        if let Some(edges) = by_source.remove(&scene.id) {
            connections.extend(edges.into_iter().map(|e| Connection {
                id: e.id,
                from_scene: e.source_scene_id,
                to_scene: e.target_scene_id,
                yaw: e.yaw,
                pitch: e.pitch,
                label: e.label,
                size: e.size,
                color: e.color,
            }));
        }

        nodes.push(NavigationScene {
            id: scene.id,
            panorama_image: resolve_url(media, Some(&scene.panorama_image)),
            map_image: resolve_url(media, scene.map_image.as_deref()),
            voiceover_audio: resolve_url(media, scene.voiceover_audio.as_deref()),
            title: scene.title,
            order: scene.order,
            initial_yaw: scene.initial_yaw,
            initial_pitch: scene.initial_pitch,
        });
    }

    NavigationGraph {
        tour: NavigationTour {
            id: tour.id,
            title: tour.title,
            scene_count: nodes.len() as i64,
        },
        scenes: nodes,
        connections,
    }
}
