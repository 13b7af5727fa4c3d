//! Handlers for the `/api/hotspots/` resource.
//!
//! Writes resolve both endpoint scenes under a share lock, check that the
//! hotspot stays inside one tour and is not a self-loop, and insert or
//! update in the same transaction. The endpoint check runs whenever both
//! scene ids parse, even if other fields are invalid.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use sqlx::PgConnection;
use vrtour_core::error::CoreError;
use vrtour_core::types::DbId;
use vrtour_core::validation::{
    check_hotspot_endpoints, field_violations, msg_missing_reference, FieldErrors, SceneEndpoint,
};
use vrtour_db::models::hotspot::{CreateHotspot, UpdateHotspot};
use vrtour_db::repositories::{HotspotRepo, SceneRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::form::{
    merge_new_fields, JsonForm, MSG_INVALID_BOOLEAN, MSG_INVALID_NUMBER, MSG_INVALID_PK,
    MSG_INVALID_STRING,
};
use crate::response::HotspotItem;
use crate::state::AppState;

fn hotspot_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Hotspot",
        id,
    })
}

/// Outcome of checking a hotspot's endpoints.
#[derive(Debug, Default)]
struct EndpointCheck {
    /// Rule violations (cross-tour, self-loop).
    violations: FieldErrors,
    /// Endpoints that do not exist.
    missing: FieldErrors,
}

/// Lock both endpoint scenes and check the hotspot invariants.
async fn check_endpoints(
    conn: &mut PgConnection,
    source_id: DbId,
    target_id: DbId,
) -> Result<EndpointCheck, sqlx::Error> {
    let refs = SceneRepo::lock_tour_refs(conn, &[source_id, target_id]).await?;
    let resolve = |id: DbId| {
        refs.iter().find(|r| r.id == id).map(|r| SceneEndpoint {
            id: r.id,
            tour_id: r.tour_id,
        })
    };

    let mut check = EndpointCheck::default();
    match (resolve(source_id), resolve(target_id)) {
        (Some(source), Some(target)) => {
            check.violations = check_hotspot_endpoints(source, target);
        }
        (source, target) => {
            if source.is_none() {
                check
                    .missing
                    .add("source_scene", msg_missing_reference(source_id));
            }
            if target.is_none() {
                check
                    .missing
                    .add("target_scene", msg_missing_reference(target_id));
            }
        }
    }
    Ok(check)
}

/// Field violations first (including the endpoint rules), then missing
/// references.
fn into_outcome(mut errors: FieldErrors, check: EndpointCheck) -> Result<(), CoreError> {
    errors.merge(check.violations);
    errors.into_result()?;
    if check.missing.is_empty() {
        Ok(())
    } else {
        Err(CoreError::Integrity(check.missing))
    }
}

/// POST /api/hotspots/create/
pub async fn create(
    State(state): State<AppState>,
    AppJson(body): AppJson,
) -> AppResult<(StatusCode, Json<HotspotItem>)> {
    let form = JsonForm::from_value(body)?;
    let mut errors = FieldErrors::new();
    let input = CreateHotspot {
        source_scene: form.parse("source_scene", &mut errors, MSG_INVALID_PK),
        target_scene: form.parse("target_scene", &mut errors, MSG_INVALID_PK),
        yaw: form.parse("yaw", &mut errors, MSG_INVALID_NUMBER),
        pitch: form.parse("pitch", &mut errors, MSG_INVALID_NUMBER),
        label: form.parse("label", &mut errors, MSG_INVALID_STRING),
        size: form.parse("size", &mut errors, MSG_INVALID_NUMBER),
        color: form.parse("color", &mut errors, MSG_INVALID_STRING),
        is_active: form.parse("is_active", &mut errors, MSG_INVALID_BOOLEAN),
    };
    merge_new_fields(&mut errors, field_violations(&input));

    let mut tx = state.pool.begin().await?;
    let check = match (input.source_scene, input.target_scene) {
        (Some(source_id), Some(target_id)) => {
            check_endpoints(&mut *tx, source_id, target_id).await?
        }
        _ => EndpointCheck::default(),
    };
    into_outcome(errors, check)?;

    let hotspot = HotspotRepo::create(&mut *tx, &input).await?;
    tx.commit().await?;
    tracing::info!(
        hotspot_id = hotspot.id,
        source_scene_id = hotspot.source_scene_id,
        target_scene_id = hotspot.target_scene_id,
        "Hotspot created"
    );

    let row = HotspotRepo::find_with_target(&state.pool, hotspot.id)
        .await?
        .ok_or_else(|| hotspot_not_found(hotspot.id))?;
    Ok((StatusCode::CREATED, Json(HotspotItem::from(row))))
}

/// PUT /api/hotspots/{id}/
///
/// Partial update. Endpoints left out keep their current scene, and the
/// resulting pair is checked like on create.
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(body): AppJson,
) -> AppResult<Json<HotspotItem>> {
    let form = JsonForm::from_value(body)?;
    let mut errors = FieldErrors::new();
    let input = UpdateHotspot {
        source_scene: form.parse("source_scene", &mut errors, MSG_INVALID_PK),
        target_scene: form.parse("target_scene", &mut errors, MSG_INVALID_PK),
        yaw: form.parse("yaw", &mut errors, MSG_INVALID_NUMBER),
        pitch: form.parse("pitch", &mut errors, MSG_INVALID_NUMBER),
        label: form.parse("label", &mut errors, MSG_INVALID_STRING),
        size: form.parse("size", &mut errors, MSG_INVALID_NUMBER),
        color: form.parse("color", &mut errors, MSG_INVALID_STRING),
        is_active: form.parse("is_active", &mut errors, MSG_INVALID_BOOLEAN),
    };
    merge_new_fields(&mut errors, field_violations(&input));

    let mut tx = state.pool.begin().await?;
    let current = HotspotRepo::find_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| hotspot_not_found(id))?;

    let source_id = input.source_scene.unwrap_or(current.source_scene_id);
    let target_id = input.target_scene.unwrap_or(current.target_scene_id);
    let check = check_endpoints(&mut *tx, source_id, target_id).await?;
    into_outcome(errors, check)?;

    HotspotRepo::update(&mut *tx, id, &input)
        .await?
        .ok_or_else(|| hotspot_not_found(id))?;
    tx.commit().await?;
    tracing::info!(hotspot_id = id, "Hotspot updated");

    let row = HotspotRepo::find_with_target(&state.pool, id)
        .await?
        .ok_or_else(|| hotspot_not_found(id))?;
    Ok(Json(HotspotItem::from(row)))
}

/// DELETE /api/hotspots/{id}/
pub async fn delete(State(state): State<AppState>, AppPath(id): AppPath<DbId>) -> AppResult<StatusCode> {
    if HotspotRepo::delete(&state.pool, id).await? {
        tracing::info!(hotspot_id = id, "Hotspot deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(hotspot_not_found(id))
    }
}
