//! Places API Server
//!
//! HTTP API for managing favorite places.
//! Thin layer over the PlaceOrchestrator: validates input, maps results to statuses.

use crate::application::PlaceOrchestrator;
use crate::domain::entities::{Place, PlaceId, PlaceInput};
use crate::domain::errors::{StoreError, ValidationError};
use crate::infrastructure::shutdown_signal;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Request body for creating a place with an auto-detected location.
#[derive(Debug, Clone, Deserialize)]
pub struct AutoPlaceRequest {
    #[serde(default)]
    pub description: Option<String>,
}

/// Pagination parameters for the list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<usize>,
    pub size: Option<usize>,
}

/// Single place response.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaceResponse {
    pub data: Place,
}

/// Page of places.
#[derive(Debug, Serialize, Deserialize)]
pub struct PlacesPage {
    pub items: Vec<Place>,
    pub total: usize,
    pub page: usize,
    pub size: usize,
}

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Errors surfaced by the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("place {0} not found")]
    NotFound(PlaceId),
    #[error("place was not created")]
    NotCreated,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::NotCreated | Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let Self::Store(e) = &self {
            tracing::error!("store failure: {:?}", e);
        }
        (
            status,
            Json(serde_json::json!({
                "error": self.to_string()
            })),
        )
            .into_response()
    }
}

/// API Server state.
#[derive(Clone)]
pub struct ApiState {
    pub places: Arc<PlaceOrchestrator>,
    /// Default page size for listing
    pub page_size: usize,
}

impl ApiState {
    pub fn new(places: Arc<PlaceOrchestrator>, page_size: usize) -> Self {
        Self { places, page_size }
    }
}

/// Build the router with all place routes.
pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/v1/places", get(list_handler).post(create_handler))
        .route("/api/v1/places/auto", post(create_auto_handler))
        .route(
            "/api/v1/places/:id",
            get(get_handler).patch(update_handler).delete(delete_handler),
        )
        .with_state(state)
}

/// API Server for places.
pub struct ApiServer {
    listen_addr: String,
    state: ApiState,
}

impl ApiServer {
    pub fn new(listen_addr: String, state: ApiState) -> Self {
        Self { listen_addr, state }
    }

    /// Run the API server until a shutdown signal arrives.
    pub async fn run(&self) -> anyhow::Result<()> {
        let app = router(self.state.clone()).layer(TraceLayer::new_for_http());

        let listener = TcpListener::bind(&self.listen_addr).await?;
        tracing::info!("places API listening on {}", self.listen_addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }
}

// Handler functions

async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn list_handler(
    State(state): State<ApiState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PlacesPage>, ApiError> {
    let page = params.page.unwrap_or(1).max(1);
    let size = params.size.unwrap_or(state.page_size).max(1);

    let places = state.places.list_all().await?;
    let total = places.len();
    let items = places
        .into_iter()
        .skip((page - 1).saturating_mul(size))
        .take(size)
        .collect();

    Ok(Json(PlacesPage {
        items,
        total,
        page,
        size,
    }))
}

async fn get_handler(
    State(state): State<ApiState>,
    Path(id): Path<PlaceId>,
) -> Result<Json<PlaceResponse>, ApiError> {
    let place = state.places.get_by_id(id).await?.ok_or(ApiError::NotFound(id))?;
    Ok(Json(PlaceResponse { data: place }))
}

async fn create_handler(
    State(state): State<ApiState>,
    Json(input): Json<PlaceInput>,
) -> Result<(StatusCode, Json<PlaceResponse>), ApiError> {
    input.validate_for_create()?;
    let id = state.places.create(&input).await?.ok_or(ApiError::NotCreated)?;
    created_response(&state, id).await
}

async fn create_auto_handler(
    State(state): State<ApiState>,
    Json(req): Json<AutoPlaceRequest>,
) -> Result<(StatusCode, Json<PlaceResponse>), ApiError> {
    let input = PlaceInput::description_only(req.description);
    input.validate_for_create()?;
    let id = state
        .places
        .create_auto(input.description)
        .await?
        .ok_or(ApiError::NotCreated)?;
    created_response(&state, id).await
}

async fn created_response(
    state: &ApiState,
    id: PlaceId,
) -> Result<(StatusCode, Json<PlaceResponse>), ApiError> {
    let place = state.places.get_by_id(id).await?.ok_or(ApiError::NotFound(id))?;
    tracing::debug!("created place {} via API", id);
    Ok((StatusCode::CREATED, Json(PlaceResponse { data: place })))
}

async fn update_handler(
    State(state): State<ApiState>,
    Path(id): Path<PlaceId>,
    Json(input): Json<PlaceInput>,
) -> Result<Json<PlaceResponse>, ApiError> {
    input.validate()?;
    if state.places.update(id, &input).await? == 0 {
        return Err(ApiError::NotFound(id));
    }
    let place = state.places.get_by_id(id).await?.ok_or(ApiError::NotFound(id))?;
    Ok(Json(PlaceResponse { data: place }))
}

async fn delete_handler(
    State(state): State<ApiState>,
    Path(id): Path<PlaceId>,
) -> Result<StatusCode, ApiError> {
    if state.places.delete(id).await? == 0 {
        return Err(ApiError::NotFound(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
