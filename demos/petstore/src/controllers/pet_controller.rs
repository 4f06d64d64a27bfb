use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};

use crate::models::{ErrorModel, NewPet, PetFilter};
use crate::services::PetService;

fn not_found(id: i64) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorModel::new(format!("pet {id} not found"))),
    )
        .into_response()
}

async fn find_pets(State(service): State<PetService>, Query(filter): Query<PetFilter>) -> Response {
    let tags: Vec<&str> = filter
        .tags
        .as_deref()
        .map(|t| t.split(',').map(str::trim).filter(|t| !t.is_empty()).collect())
        .unwrap_or_default();
    Json(service.list(&tags, filter.limit).await).into_response()
}

async fn add_pet(State(service): State<PetService>, Json(new_pet): Json<NewPet>) -> Response {
    let pet = service.create(new_pet).await;
    tracing::info!(id = pet.id, "pet added");
    Json(pet).into_response()
}

async fn find_pet_by_id(State(service): State<PetService>, Path(id): Path<i64>) -> Response {
    match service.get_by_id(id).await {
        Some(pet) => Json(pet).into_response(),
        None => not_found(id),
    }
}

async fn delete_pet(State(service): State<PetService>, Path(id): Path<i64>) -> Response {
    if service.delete(id).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        not_found(id)
    }
}

/// Handlers for the routes documented in [`crate::docs::routes`].
pub fn router(service: PetService) -> Router {
    Router::new()
        .route("/pets", get(find_pets).post(add_pet))
        .route("/pets/{id}", get(find_pet_by_id).delete(delete_pet))
        .with_state(service)
}
