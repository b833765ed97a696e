//! Handlers for the service catalog.

use autoshop_core::error::CoreError;
use autoshop_core::types::DbId;
use autoshop_db::models::service::{CreateService, ServiceDeletion, UpdateService};
use autoshop_db::repositories::ServiceRepo;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::query::SearchParams;
use crate::response::{DataResponse, PagedResponse};
use crate::state::AppState;

fn service_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Service",
        id,
    })
}

/// GET /api/services
///
/// Alphabetical. `search` matches name or description.
pub async fn list_services(
    State(state): State<AppState>,
    AppQuery(params): AppQuery<SearchParams>,
) -> AppResult<impl IntoResponse> {
    let window = params.window();
    let page = ServiceRepo::list(&state.pool, params.search.as_deref(), window).await?;
    Ok(Json(PagedResponse::new(page, window)))
}

/// GET /api/services/all
///
/// The whole catalog, for the order form's service picker.
pub async fn list_all_services(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let services = ServiceRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse { data: services }))
}

/// POST /api/services
pub async fn create_service(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateService>,
) -> AppResult<impl IntoResponse> {
    let service = ServiceRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: service })))
}

/// GET /api/services/{id}
pub async fn get_service(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    let service = ServiceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| service_not_found(id))?;
    Ok(Json(DataResponse { data: service }))
}

/// PUT /api/services/{id}
pub async fn update_service(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateService>,
) -> AppResult<impl IntoResponse> {
    let service = ServiceRepo::update(&state.pool, id, &input).await?;
    Ok(Json(DataResponse { data: service }))
}

/// DELETE /api/services/{id}
///
/// 409 with the reference count while active orders still select the service.
pub async fn delete_service(
    State(state): State<AppState>,
    AppPath(id): AppPath<DbId>,
) -> AppResult<impl IntoResponse> {
    match ServiceRepo::delete(&state.pool, id).await? {
        ServiceDeletion::Deleted { .. } => Ok(StatusCode::NO_CONTENT),
        ServiceDeletion::NotFound => Err(service_not_found(id)),
        ServiceDeletion::HasActiveReferences { count } => {
            Err(AppError::Core(CoreError::Conflict {
                message: format!(
                    "Service is used by {count} active order(s) and cannot be deleted"
                ),
                count,
            }))
        }
    }
}
