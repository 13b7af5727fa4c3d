//! Handlers for the `/api/scenes/` resource.
//!
//! Create and update accept `multipart/form-data` so panorama, voiceover and
//! map files travel with the scene's fields. Files are stored before the
//! database write and removed again if that write fails.

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use vrtour_core::error::CoreError;
use vrtour_core::media::{MediaKind, MediaUpload};
use vrtour_core::types::DbId;
use vrtour_core::validation::{
    field_violations, msg_missing_reference, FieldErrors, MSG_REQUIRED, MSG_SCENE_LINKED,
};
use vrtour_db::models::scene::{CreateScene, Scene, SceneMedia, SceneMediaUpdate, UpdateScene};
use vrtour_db::repositories::{HotspotRepo, SceneRepo, TourRepo};

use crate::error::{AppError, AppResult};
use crate::extract::{AppMultipart, AppPath};
use crate::handlers::form::{
    merge_new_fields, store_uploads, MultipartForm, MSG_INVALID_INTEGER, MSG_INVALID_NUMBER,
    MSG_NO_FILE,
};
use crate::media_store::discard;
use crate::response::{HotspotItem, SceneDetail};
use crate::state::AppState;

const MEDIA_SLOTS: [MediaKind; 3] = [MediaKind::Panorama, MediaKind::Voiceover, MediaKind::MapImage];

fn scene_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Scene", id })
}

/// Take every scene media upload present in the form, checking each.
fn take_media(form: &mut MultipartForm, errors: &mut FieldErrors) -> Vec<(MediaKind, MediaUpload)> {
    MEDIA_SLOTS
        .iter()
        .filter_map(|&kind| form.take_file(kind, errors).map(|u| (kind, u)))
        .collect()
}

/// GET /api/scenes/{id}/
pub async fn get_by_id(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<SceneDetail>> {
    let row = SceneRepo::find_active_detail(&state.pool, id)
        .await?
        .ok_or_else(|| scene_not_found(id))?;
    let hotspots = HotspotRepo::list_active_by_scene(&state.pool, id).await?;
    Ok(Json(SceneDetail::new(row, hotspots, state.media.as_ref())))
}

/// GET /api/scenes/{scene_id}/hotspots/
pub async fn list_hotspots(
    State(state): State<AppState>,
    AppPath(scene_id): AppPath<DbId>,
) -> AppResult<Json<Vec<HotspotItem>>> {
    let rows = HotspotRepo::list_active_by_scene(&state.pool, scene_id).await?;
    Ok(Json(rows.into_iter().map(HotspotItem::from).collect()))
}

/// POST /api/scenes/create/
///
/// Multipart fields: `tour`, `title`, `description`, `initial_yaw`,
/// `initial_pitch`, `order`, `is_active`, plus the files `panorama_image`
/// (required), `voiceover_audio` and `map_image`.
pub async fn create(
    State(state): State<AppState>,
    AppMultipart(multipart): AppMultipart,
) -> AppResult<(StatusCode, Json<SceneDetail>)> {
    let mut form = MultipartForm::read(multipart).await?;
    let mut errors = FieldErrors::new();

    let input = CreateScene {
        tour: form.parse("tour", &mut errors, MSG_INVALID_INTEGER),
        title: form.text("title"),
        description: form.text("description"),
        initial_yaw: form.parse("initial_yaw", &mut errors, MSG_INVALID_NUMBER),
        initial_pitch: form.parse("initial_pitch", &mut errors, MSG_INVALID_NUMBER),
        order: form.parse("order", &mut errors, MSG_INVALID_INTEGER),
        is_active: form.parse_bool("is_active", &mut errors),
    };
    merge_new_fields(&mut errors, field_violations(&input));

    let uploads = take_media(&mut form, &mut errors);
    if !uploads.iter().any(|(kind, _)| *kind == MediaKind::Panorama) {
        errors.add(MediaKind::Panorama.field_name(), MSG_NO_FILE);
    }
    errors.into_result()?;

    let tour_id = input
        .tour
        .ok_or_else(|| CoreError::validation("tour", MSG_REQUIRED))?;
    if TourRepo::find_by_id(&state.pool, tour_id).await?.is_none() {
        return Err(CoreError::integrity("tour", msg_missing_reference(tour_id)).into());
    }

    let mut stored = store_uploads(state.media.as_ref(), uploads).await?;
    let Some(panorama_image) = stored.remove(&MediaKind::Panorama) else {
        discard(state.media.as_ref(), &stored.into_values().collect::<Vec<_>>()).await;
        return Err(AppError::InternalError("Panorama was not stored".into()));
    };
    let media = SceneMedia {
        panorama_image,
        voiceover_audio: stored.remove(&MediaKind::Voiceover),
        map_image: stored.remove(&MediaKind::MapImage),
    };

    let scene = match SceneRepo::create(&state.pool, &input, &media).await {
        Ok(scene) => scene,
        Err(e) => {
            discard(state.media.as_ref(), &media_keys(&media)).await;
            return Err(e.into());
        }
    };
    tracing::info!(scene_id = scene.id, tour_id = scene.tour_id, "Scene created");

    let row = SceneRepo::find_detail(&state.pool, scene.id)
        .await?
        .ok_or_else(|| scene_not_found(scene.id))?;
    Ok((
        StatusCode::CREATED,
        Json(SceneDetail::new(row, Vec::new(), state.media.as_ref())),
    ))
}

/// PUT /api/scenes/{id}/
///
/// Multipart partial update: only the fields and files present are applied.
/// A scene connected by hotspots cannot move to another tour.
pub async fn update(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppMultipart(multipart): AppMultipart,
) -> AppResult<Json<SceneDetail>> {
    let mut form = MultipartForm::read(multipart).await?;
    let mut errors = FieldErrors::new();

    let input = UpdateScene {
        tour: form.parse("tour", &mut errors, MSG_INVALID_INTEGER),
        title: form.text("title"),
        description: form.text("description"),
        initial_yaw: form.parse("initial_yaw", &mut errors, MSG_INVALID_NUMBER),
        initial_pitch: form.parse("initial_pitch", &mut errors, MSG_INVALID_NUMBER),
        order: form.parse("order", &mut errors, MSG_INVALID_INTEGER),
        is_active: form.parse_bool("is_active", &mut errors),
    };
    merge_new_fields(&mut errors, field_violations(&input));
    let uploads = take_media(&mut form, &mut errors);
    errors.into_result()?;

    let mut tx = state.pool.begin().await?;
    let current = SceneRepo::find_for_update(&mut *tx, id)
        .await?
        .ok_or_else(|| scene_not_found(id))?;

    if input.tour.is_some_and(|tour_id| tour_id != current.tour_id)
        && HotspotRepo::exists_for_scene(&mut *tx, id).await?
    {
        return Err(CoreError::validation("tour", MSG_SCENE_LINKED).into());
    }

    let stored = store_uploads(state.media.as_ref(), uploads).await?;
    let new_keys: Vec<String> = stored.values().cloned().collect();
    let media = SceneMediaUpdate {
        panorama_image: stored.get(&MediaKind::Panorama).cloned(),
        voiceover_audio: stored.get(&MediaKind::Voiceover).cloned(),
        map_image: stored.get(&MediaKind::MapImage).cloned(),
    };

    let written: AppResult<Option<Scene>> = async {
        let scene = SceneRepo::update(&mut *tx, id, &input, &media).await?;
        tx.commit().await?;
        Ok(scene)
    }
    .await;
    let scene = match written {
        Ok(Some(scene)) => scene,
        Ok(None) => {
            discard(state.media.as_ref(), &new_keys).await;
            return Err(scene_not_found(id));
        }
        Err(e) => {
            discard(state.media.as_ref(), &new_keys).await;
            return Err(e);
        }
    };

    discard(state.media.as_ref(), &replaced_keys(&current, &stored)).await;
    tracing::info!(scene_id = scene.id, tour_id = scene.tour_id, "Scene updated");

    let row = SceneRepo::find_detail(&state.pool, id)
        .await?
        .ok_or_else(|| scene_not_found(id))?;
    let hotspots = HotspotRepo::list_active_by_scene(&state.pool, id).await?;
    Ok(Json(SceneDetail::new(row, hotspots, state.media.as_ref())))
}

/// DELETE /api/scenes/{id}/
///
/// Hotspots starting or ending at the scene go with it.
pub async fn delete(State(state): State<AppState>, AppPath(id): AppPath<DbId>) -> AppResult<StatusCode> {
    let scene = SceneRepo::delete(&state.pool, id)
        .await?
        .ok_or_else(|| scene_not_found(id))?;
    tracing::info!(scene_id = id, tour_id = scene.tour_id, "Scene deleted");

    let keys = media_keys(&SceneMedia {
        panorama_image: scene.panorama_image,
        voiceover_audio: scene.voiceover_audio,
        map_image: scene.map_image,
    });
    discard(state.media.as_ref(), &keys).await;
    Ok(StatusCode::NO_CONTENT)
}

fn media_keys(media: &SceneMedia) -> Vec<String> {
    let mut keys = vec![media.panorama_image.clone()];
    keys.extend(media.voiceover_audio.clone());
    keys.extend(media.map_image.clone());
    keys
}

/// Keys of the files an update replaced.
fn replaced_keys(previous: &Scene, stored: &HashMap<MediaKind, String>) -> Vec<String> {
    let mut keys = Vec::new();
    if stored.contains_key(&MediaKind::Panorama) {
        keys.push(previous.panorama_image.clone());
    }
    if stored.contains_key(&MediaKind::Voiceover) {
        keys.extend(previous.voiceover_audio.clone());
    }
    if stored.contains_key(&MediaKind::MapImage) {
        keys.extend(previous.map_image.clone());
    }
    keys.retain(|k| !k.is_empty());
    keys
}
