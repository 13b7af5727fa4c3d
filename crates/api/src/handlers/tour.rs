//! Handlers for the `/api/tours/` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use vrtour_core::error::CoreError;
use vrtour_core::media::MediaKind;
use vrtour_core::navigation::{assemble, NavigationGraph};
use vrtour_core::tour_query::{parse_ordering, search_patterns};
use vrtour_core::types::DbId;
use vrtour_core::validation::{field_violations, FieldErrors};
use vrtour_db::models::tour::{CreateTour, TourListQuery, TourWithStats, UpdateTour};
use vrtour_db::repositories::{NavigationRepo, SceneRepo, TourRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppMultipart, AppPath, AppQuery};
use crate::handlers::form::{
    merge_new_fields, store_uploads, JsonForm, MultipartForm, MSG_INVALID_BOOLEAN,
    MSG_INVALID_STRING, MSG_NO_FILE,
};
use crate::media_store::discard;
use crate::response::{SceneListItem, TourDetail, TourListItem};
use crate::state::AppState;

fn tour_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Tour", id })
}

/// Query parameters for the tour list.
#[derive(Debug, Deserialize)]
pub struct TourListParams {
    pub search: Option<String>,
    pub ordering: Option<String>,
}

/// GET /api/tours/
pub async fn list(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<TourListParams>,
) -> AppResult<Json<Vec<TourListItem>>> {
    let query = TourListQuery {
        search: search_patterns(params.search.as_deref()),
        ordering: parse_ordering(params.ordering.as_deref()),
    };
    let rows = TourRepo::list_active(&state.pool, &query).await?;
    let items = rows
        .into_iter()
        .map(|row| TourListItem::new(row, state.media.as_ref()))
        .collect();
    Ok(Json(items))
}

/// GET /api/tours/{id}/
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<TourDetail>> {
    let row = TourRepo::find_active_with_stats(&state.pool, id)
        .await?
        .ok_or_else(|| tour_not_found(id))?;
    Ok(Json(tour_detail(&state, row).await?))
}

/// POST /api/tours/create/
pub async fn create(
    State(state): State<AppState>,
    AppJson(body): AppJson,
) -> AppResult<(StatusCode, Json<TourDetail>)> {
    let form = JsonForm::from_value(body)?;
    let mut errors = FieldErrors::new();
    let input = CreateTour {
        title: form.parse("title", &mut errors, MSG_INVALID_STRING),
        description: form.parse("description", &mut errors, MSG_INVALID_STRING),
        is_active: form.parse("is_active", &mut errors, MSG_INVALID_BOOLEAN),
    };
    merge_new_fields(&mut errors, field_violations(&input));
    errors.into_result()?;

    let tour = TourRepo::create(&state.pool, &input).await?;
    tracing::info!(tour_id = tour.id, "Tour created");

    let row = TourWithStats {
        tour,
        scene_count: 0,
        first_scene_id: None,
    };
    let detail = TourDetail::new(row, Vec::new(), None, state.media.as_ref());
    Ok((StatusCode::CREATED, Json(detail)))
}

/// PUT /api/tours/{id}/
///
/// Applies to inactive tours as well, so a tour can be reactivated.
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(body): AppJson,
) -> AppResult<Json<TourDetail>> {
    let form = JsonForm::from_value(body)?;
    let mut errors = FieldErrors::new();
    let input = UpdateTour {
        title: form.parse("title", &mut errors, MSG_INVALID_STRING),
        description: form.parse("description", &mut errors, MSG_INVALID_STRING),
        is_active: form.parse("is_active", &mut errors, MSG_INVALID_BOOLEAN),
    };
    merge_new_fields(&mut errors, field_violations(&input));
    errors.into_result()?;

    TourRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| tour_not_found(id))?;
    tracing::info!(tour_id = id, "Tour updated");

    let row = TourRepo::find_with_stats(&state.pool, id)
        .await?
        .ok_or_else(|| tour_not_found(id))?;
    Ok(Json(tour_detail(&state, row).await?))
}

/// PUT /api/tours/{id}/thumbnail/
///
/// Multipart form with a single `thumbnail` file. The replaced file is
/// removed once the new key is committed.
pub async fn replace_thumbnail(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppMultipart(multipart): AppMultipart,
) -> AppResult<Json<TourDetail>> {
    let mut form = MultipartForm::read(multipart).await?;
    let mut errors = FieldErrors::new();
    let upload = form.take_file(MediaKind::Thumbnail, &mut errors);
    if upload.is_none() {
        errors.add(MediaKind::Thumbnail.field_name(), MSG_NO_FILE);
    }
    errors.into_result()?;

    let uploads = upload
        .map(|u| vec![(MediaKind::Thumbnail, u)])
        .unwrap_or_default();
    let stored = store_uploads(state.media.as_ref(), uploads).await?;
    let Some(key) = stored.get(&MediaKind::Thumbnail).cloned() else {
        return Err(AppError::InternalError("Thumbnail was not stored".into()));
    };

    let replaced = match TourRepo::replace_thumbnail(&state.pool, id, &key).await {
        Ok(Some((_, previous))) => previous,
        Ok(None) => {
            discard(state.media.as_ref(), &[key]).await;
            return Err(tour_not_found(id));
        }
        Err(e) => {
            discard(state.media.as_ref(), &[key]).await;
            return Err(e.into());
        }
    };
    if let Some(previous) = replaced {
        discard(state.media.as_ref(), &[previous]).await;
    }
    tracing::info!(tour_id = id, "Tour thumbnail replaced");

    let row = TourRepo::find_with_stats(&state.pool, id)
        .await?
        .ok_or_else(|| tour_not_found(id))?;
    Ok(Json(tour_detail(&state, row).await?))
}

/// DELETE /api/tours/{id}/
///
/// Removes the tour with its scenes and hotspots, then their media files.
pub async fn delete(State(state): State<AppState>, AppPath(id): AppPath<DbId>) -> AppResult<StatusCode> {
    let keys = TourRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| tour_not_found(id))?;
    tracing::info!(tour_id = id, files = keys.len(), "Tour deleted");

    discard(state.media.as_ref(), &keys).await;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/tours/{tour_id}/scenes/
///
/// An unknown or inactive tour yields an empty list rather than a 404.
pub async fn list_scenes(
    State(state): State<AppState>,
    AppPath(tour_id): AppPath<DbId>,
) -> AppResult<Json<Vec<SceneListItem>>> {
    let rows = SceneRepo::list_active_by_tour(&state.pool, tour_id).await?;
    let items = rows
        .into_iter()
        .map(|row| SceneListItem::new(row, state.media.as_ref()))
        .collect();
    Ok(Json(items))
}

/// GET /api/tours/{tour_id}/navigation/
pub async fn navigation(
    State(state): State<AppState>,
    AppPath(tour_id): AppPath<DbId>,
) -> AppResult<Json<NavigationGraph>> {
    let rows = NavigationRepo::load(&state.pool, tour_id)
        .await?
        .ok_or_else(|| tour_not_found(tour_id))?;
    let graph = assemble(rows.tour, rows.scenes, rows.hotspots, state.media.as_ref());
    Ok(Json(graph))
}

/// Render a tour with its active scenes and its starting scene.
async fn tour_detail(state: &AppState, row: TourWithStats) -> AppResult<TourDetail> {
    let scenes = SceneRepo::list_active_by_tour(&state.pool, row.tour.id).await?;

    let first_scene = match row.first_scene_id {
        Some(first_id) => match scenes.iter().find(|s| s.scene.id == first_id) {
            Some(listed) => Some(listed.scene.clone()),
            None => SceneRepo::find_by_id(&state.pool, first_id).await?,
        },
        None => None,
    };

    Ok(TourDetail::new(row, scenes, first_scene, state.media.as_ref()))
}
