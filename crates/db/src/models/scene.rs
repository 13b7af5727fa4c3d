//! Scene entity model and DTOs.
//!
//! The API calls a scene's position `order`; the column is `sort_order`.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use vrtour_core::navigation::SceneNode;
use vrtour_core::types::{DbId, SceneOrder, Timestamp};

/// A row from the `scenes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Scene {
    pub id: DbId,
    pub tour_id: DbId,
    pub title: String,
    pub description: String,
    // -- Media storage keys --
    pub panorama_image: String,
    pub voiceover_audio: Option<String>,
    pub map_image: Option<String>,
    // -- Initial camera --
    pub initial_yaw: f64,
    pub initial_pitch: f64,
    pub sort_order: SceneOrder,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A scene plus its live hotspot count.
#[derive(Debug, Clone, FromRow)]
pub struct SceneWithStats {
    #[sqlx(flatten)]
    pub scene: Scene,
    /// Count of hotspots sourced from this scene, active or not.
    pub hotspot_count: i64,
}

/// A scene joined with its tour title, for the detail view.
#[derive(Debug, Clone, FromRow)]
pub struct SceneDetailRow {
    #[sqlx(flatten)]
    pub scene: Scene,
    pub tour_title: String,
    pub hotspot_count: i64,
}

/// Id and tour of a scene, as locked while validating a hotspot write.
#[derive(Debug, Clone, Copy, FromRow)]
pub struct SceneTourRef {
    pub id: DbId,
    pub tour_id: DbId,
}

impl From<Scene> for SceneNode {
    fn from(scene: Scene) -> Self {
        SceneNode {
            id: scene.id,
            title: scene.title,
            order: scene.sort_order,
            initial_yaw: scene.initial_yaw,
            initial_pitch: scene.initial_pitch,
            panorama_image: scene.panorama_image,
            map_image: scene.map_image,
            voiceover_audio: scene.voiceover_audio,
        }
    }
}

/// DTO for creating a new scene.
///
/// Media arrives separately as uploads; see [`SceneMedia`].
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateScene {
    #[validate(required(message = "This field is required."))]
    pub tour: Option<DbId>,
    #[validate(
        required(message = "This field is required."),
        length(max = 200, message = "Ensure this field has no more than 200 characters."),
        custom(function = "vrtour_core::validation::validate_not_blank")
    )]
    pub title: Option<String>,
    pub description: Option<String>,
    /// Defaults to 0 if omitted.
    #[validate(range(min = -180.0, max = 180.0, message = "Initial yaw must be between -180 and 180 degrees."))]
    pub initial_yaw: Option<f64>,
    /// Defaults to 0 if omitted.
    #[validate(range(min = -90.0, max = 90.0, message = "Initial pitch must be between -90 and 90 degrees."))]
    pub initial_pitch: Option<f64>,
    /// Defaults to 0 if omitted.
    #[validate(range(min = 0, message = "Order must be a non-negative integer."))]
    pub order: Option<SceneOrder>,
    /// Defaults to `true` if omitted.
    pub is_active: Option<bool>,
}

/// Storage keys of the media stored for a new scene.
#[derive(Debug, Clone)]
pub struct SceneMedia {
    pub panorama_image: String,
    pub voiceover_audio: Option<String>,
    pub map_image: Option<String>,
}

/// DTO for updating an existing scene. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateScene {
    pub tour: Option<DbId>,
    #[validate(
        length(max = 200, message = "Ensure this field has no more than 200 characters."),
        custom(function = "vrtour_core::validation::validate_not_blank")
    )]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = -180.0, max = 180.0, message = "Initial yaw must be between -180 and 180 degrees."))]
    pub initial_yaw: Option<f64>,
    #[validate(range(min = -90.0, max = 90.0, message = "Initial pitch must be between -90 and 90 degrees."))]
    pub initial_pitch: Option<f64>,
    #[validate(range(min = 0, message = "Order must be a non-negative integer."))]
    pub order: Option<SceneOrder>,
    pub is_active: Option<bool>,
}

/// Replacement storage keys for an update. `None` leaves the slot unchanged.
#[derive(Debug, Clone, Default)]
pub struct SceneMediaUpdate {
    pub panorama_image: Option<String>,
    pub voiceover_audio: Option<String>,
    pub map_image: Option<String>,
}
