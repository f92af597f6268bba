//! HTTP API for the card catalog
//!
//! Serves the unified catalog, filtered views, deck imports, price refreshes
//! and card images.

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::catalog::{CatalogService, CatalogStatus};
use crate::config::Config;
use crate::deck_import::{import_deck_list, parse_deck_list, ImportReport};
use crate::error::CatalogError;
use crate::filter::{annotate_owned, apply_filters, FilterSelection};
use crate::image_cache::{
    content_type_for, download_all, fetch_image_cached, DownloadSummary, ImageCache,
};
use crate::models::{CardRecord, DeckEntry};
use crate::pricing::ReconcileReport;

/// Shared application state (catalog service + image cache + HTTP client)
#[derive(Clone)]
pub struct AppState {
    catalog: Arc<CatalogService>,
    images: Arc<ImageCache>,
    client: reqwest::Client,
    download_concurrency: usize,
}

impl AppState {
    pub fn new(
        catalog: Arc<CatalogService>,
        images: Arc<ImageCache>,
        client: reqwest::Client,
        download_concurrency: usize,
    ) -> Self {
        Self {
            catalog,
            images,
            client,
            download_concurrency,
        }
    }
}

/// API response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

/// Error returned by handlers, rendered as an `ApiResponse` with `success: false`
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        let (status, message) = match &err {
            CatalogError::NotLoaded => (StatusCode::BAD_REQUEST, err.to_string()),
            CatalogError::RefreshInProgress => (StatusCode::CONFLICT, err.to_string()),
            CatalogError::InvalidImageUrl(_) => (StatusCode::BAD_REQUEST, err.to_string()),
            CatalogError::ImageFetchFailed(_)
            | CatalogError::Network(_)
            | CatalogError::HttpStatus(_) => {
                (StatusCode::BAD_GATEWAY, "Failed to fetch upstream resource".to_string())
            }
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load card catalog".to_string(),
            ),
        };

        if status.is_server_error() {
            log::error!("Request failed: {}", err);
        } else {
            log::warn!("Request rejected: {}", err);
        }

        Self { status, message }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body: ApiResponse<()> = ApiResponse {
            success: false,
            data: None,
            error: Some(self.message),
        };
        (self.status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// Body of POST /api/cards/search
#[derive(Deserialize, Default)]
#[serde(default)]
struct SearchRequest {
    selection: FilterSelection,
    /// Owned quantities by product ID, used by the owned-only facet
    owned: Option<HashMap<String, u32>>,
}

/// Body of POST /api/deck-import
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct DeckImportRequest {
    deck_list: Vec<DeckEntry>,
    /// Pasted `QUANTITYxNUMBER` lines, appended after `deck_list`
    deck_text: Option<String>,
}

/// Query of GET /download-image
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DownloadImageParams {
    image_url: String,
}

/// GET /api/cards - the full catalog
async fn cards_handler(
    State(state): State<AppState>,
) -> Result<Json<Arc<Vec<CardRecord>>>, AppError> {
    Ok(Json(state.catalog.catalog().await?))
}

/// POST /api/cards/search - the catalog filtered by a facet selection
async fn search_handler(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Vec<CardRecord>> {
    let catalog = state.catalog.catalog().await?;

    let results = match (&request.owned, request.selection.is_empty()) {
        (Some(owned), true) => annotate_owned(&catalog, owned),
        (Some(owned), false) => {
            apply_filters(&annotate_owned(&catalog, owned), &request.selection)
        }
        (None, true) => catalog.to_vec(),
        (None, false) => apply_filters(&catalog, &request.selection),
    };

    Ok(ApiResponse::ok(results))
}

/// GET /api/status
async fn status_handler(State(state): State<AppState>) -> Json<ApiResponse<CatalogStatus>> {
    ApiResponse::ok(state.catalog.status().await)
}

/// POST /api/update-prices - reconcile the cached catalog against the live feeds
async fn update_prices_handler(State(state): State<AppState>) -> ApiResult<ReconcileReport> {
    let report = state.catalog.refresh_prices().await?;
    Ok(ApiResponse::ok(report))
}

/// POST /api/deck-import
async fn deck_import_handler(
    State(state): State<AppState>,
    Json(request): Json<DeckImportRequest>,
) -> ApiResult<ImportReport> {
    let mut entries = request.deck_list;
    if let Some(text) = &request.deck_text {
        entries.extend(parse_deck_list(text));
    }

    let registry = state.catalog.registry().clone();
    let report = tokio::task::spawn_blocking(move || import_deck_list(&registry, &entries))
        .await
        .map_err(CatalogError::from)?;

    Ok(ApiResponse::ok(report))
}

/// GET /download-image?imageUrl={url}
/// Serves the high-resolution variant of a card image, caching it on disk
async fn download_image_handler(
    State(state): State<AppState>,
    Query(params): Query<DownloadImageParams>,
) -> Result<Response, AppError> {
    let image = fetch_image_cached(&state.images, &state.client, &params.image_url).await?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static(content_type_for(&image.file_name)),
            ),
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=86400"),
            ),
        ],
        image.bytes,
    )
        .into_response())
}

/// POST /api/download-all-images - cache every catalog image on disk
async fn download_all_images_handler(
    State(state): State<AppState>,
) -> ApiResult<DownloadSummary> {
    let catalog = state.catalog.catalog().await?;
    let summary = download_all(
        &state.images,
        &state.client,
        catalog.iter().map(|card| card.image_url.as_str()),
        state.download_concurrency,
    )
    .await;

    Ok(ApiResponse::ok(summary))
}

/// Build the web server router
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let images = ServeDir::new(state.images.cache_dir());

    Router::new()
        .route("/api/cards", get(cards_handler))
        .route("/api/cards/search", post(search_handler))
        .route("/api/status", get(status_handler))
        .route("/api/update-prices", post(update_prices_handler))
        .route("/api/deck-import", post(deck_import_handler))
        .route("/api/download-all-images", post(download_all_images_handler))
        .route("/download-image", get(download_image_handler))
        .nest_service("/images", images)
        .layer(cors)
        .with_state(state)
}

/// Start the web server (async)
///
/// Binds to 0.0.0.0 (all interfaces) to work with Docker port mapping.
pub async fn serve(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let catalog = Arc::new(CatalogService::from_config(config, client.clone())?);
    let images = Arc::new(ImageCache::new(&config.image_dir));
    let state = AppState::new(catalog, images, client, config.download_concurrency);

    let app = create_router(state);
    let addr = format!("0.0.0.0:{}", config.port);

    log::info!("Card catalog API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}
