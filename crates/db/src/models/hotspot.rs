//! Hotspot entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use vrtour_core::navigation::HotspotEdge;
use vrtour_core::types::{DbId, Timestamp};

/// A row from the `hotspots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Hotspot {
    pub id: DbId,
    pub source_scene_id: DbId,
    pub target_scene_id: DbId,
    pub yaw: f64,
    pub pitch: f64,
    pub label: String,
    pub size: f64,
    pub color: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A hotspot with the title of the scene it leads to.
#[derive(Debug, Clone, FromRow)]
pub struct HotspotWithTarget {
    #[sqlx(flatten)]
    pub hotspot: Hotspot,
    pub target_scene_title: String,
}

impl From<HotspotWithTarget> for HotspotEdge {
    fn from(row: HotspotWithTarget) -> Self {
        let h = row.hotspot;
        HotspotEdge {
            id: h.id,
            source_scene_id: h.source_scene_id,
            target_scene_id: h.target_scene_id,
            yaw: h.yaw,
            pitch: h.pitch,
            label: h.label,
            size: h.size,
            color: h.color,
        }
    }
}

/// DTO for creating a new hotspot.
///
/// Field names match the API, so validation errors key on them directly.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateHotspot {
    #[validate(required(message = "This field is required."))]
    pub source_scene: Option<DbId>,
    #[validate(required(message = "This field is required."))]
    pub target_scene: Option<DbId>,
    #[validate(
        required(message = "This field is required."),
        range(min = -180.0, max = 180.0, message = "Yaw must be between -180 and 180 degrees.")
    )]
    pub yaw: Option<f64>,
    #[validate(
        required(message = "This field is required."),
        range(min = -90.0, max = 90.0, message = "Pitch must be between -90 and 90 degrees.")
    )]
    pub pitch: Option<f64>,
    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub label: Option<String>,
    /// Defaults to 1.0 if omitted.
    #[validate(range(min = 0.1, max = 5.0, message = "Size must be between 0.1 and 5.0."))]
    pub size: Option<f64>,
    /// Defaults to `#ffffff` if omitted.
    #[validate(custom(function = "vrtour_core::validation::validate_hex_color"))]
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

/// DTO for updating an existing hotspot. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateHotspot {
    pub source_scene: Option<DbId>,
    pub target_scene: Option<DbId>,
    #[validate(range(min = -180.0, max = 180.0, message = "Yaw must be between -180 and 180 degrees."))]
    pub yaw: Option<f64>,
    #[validate(range(min = -90.0, max = 90.0, message = "Pitch must be between -90 and 90 degrees."))]
    pub pitch: Option<f64>,
    #[validate(length(max = 100, message = "Ensure this field has no more than 100 characters."))]
    pub label: Option<String>,
    #[validate(range(min = 0.1, max = 5.0, message = "Size must be between 0.1 and 5.0."))]
    pub size: Option<f64>,
    #[validate(custom(function = "vrtour_core::validation::validate_hex_color"))]
    pub color: Option<String>,
    pub is_active: Option<bool>,
}
