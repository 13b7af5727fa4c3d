//! Tour entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;
use vrtour_core::navigation::TourNode;
use vrtour_core::tour_query::TourOrdering;
use vrtour_core::types::{DbId, Timestamp};

/// A row from the `tours` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tour {
    pub id: DbId,
    pub title: String,
    pub description: String,
    /// Storage key of the thumbnail, if any.
    pub thumbnail: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A tour plus the values derived from its scenes at read time.
#[derive(Debug, Clone, FromRow)]
pub struct TourWithStats {
    #[sqlx(flatten)]
    pub tour: Tour,
    /// Count of all scenes of the tour, active or not.
    pub scene_count: i64,
    /// Active scene with the lowest order.
    pub first_scene_id: Option<DbId>,
}

impl From<Tour> for TourNode {
    fn from(tour: Tour) -> Self {
        TourNode {
            id: tour.id,
            title: tour.title,
        }
    }
}

/// DTO for creating a new tour.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateTour {
    #[validate(
        required(message = "This field is required."),
        length(max = 200, message = "Ensure this field has no more than 200 characters."),
        custom(function = "vrtour_core::validation::validate_not_blank")
    )]
    pub title: Option<String>,
    pub description: Option<String>,
    /// Defaults to `true` if omitted.
    pub is_active: Option<bool>,
}

/// DTO for updating an existing tour. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTour {
    #[validate(
        length(max = 200, message = "Ensure this field has no more than 200 characters."),
        custom(function = "vrtour_core::validation::validate_not_blank")
    )]
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Filters and ordering for the active-tour listing.
#[derive(Debug, Clone, Default)]
pub struct TourListQuery {
    /// `ILIKE` patterns; each must match the title or the description.
    pub search: Vec<String>,
    /// Ordering terms applied left to right. Empty means newest first.
    pub ordering: Vec<TourOrdering>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use vrtour_core::validation::{field_violations, MSG_BLANK, MSG_REQUIRED};

    #[test]
    fn missing_title_is_required() {
        let errors = field_violations(&CreateTour::default());
        assert_eq!(errors.get("title"), Some(&[MSG_REQUIRED.to_string()][..]));
    }

    #[test]
    fn blank_title_is_reported_as_blank() {
        let input = CreateTour {
            title: Some(String::new()),
            ..Default::default()
        };
        let errors = field_violations(&input);
        assert_eq!(errors.get("title"), Some(&[MSG_BLANK.to_string()][..]));
    }
}
