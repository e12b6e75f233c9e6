use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use server_api::{health, list_options, select_datasets, ApiContext};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{
        OptionList, API_KEY_HEADER, DATASET_PARAM, GET_OPTIONS_ROUTE, HEALTHZ_ROUTE,
        SELECT_DATASETS_ROUTE,
    },
};
use storage::Storage;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, normalize_database_url, Settings};

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

/// The options endpoint takes no meaningful body; anything larger than this is
/// refused before it reaches a handler.
const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings();
    let database_url = normalize_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify permissions on its directory"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state), &settings);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(
        %addr,
        project = %settings.project_name,
        static_dir = %settings.static_dir.display(),
        "server listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(%error, "failed to install ctrl-c handler; shutting down");
    }
}

fn build_router(state: Arc<AppState>, settings: &Settings) -> Router {
    Router::new()
        .route(HEALTHZ_ROUTE, get(healthz))
        .route(GET_OPTIONS_ROUTE, post(get_options))
        .route(SELECT_DATASETS_ROUTE, get(get_datasets))
        .fallback_service(ServeDir::new(&settings.static_dir))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(cors_layer(settings))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if settings.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = settings
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring malformed cors origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}

async fn healthz(
    State(state): State<Arc<AppState>>,
) -> Result<&'static str, (StatusCode, Json<ApiError>)> {
    health(&state.api)
        .await
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, Json(e)))?;
    Ok("ok")
}

type ApiRejection = (StatusCode, Json<ApiError>);

async fn get_options(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<OptionList>, ApiRejection> {
    let api_key = api_key_from(&headers)?;
    let options = list_options(&state.api, api_key)
        .await
        .map_err(|e| reject("options lookup failed", e))?;
    info!(count = options.len(), "options served");
    Ok(Json(options))
}

async fn get_datasets(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<OptionList>, ApiRejection> {
    let api_key = api_key_from(&headers)?;
    let requested: Vec<String> = pairs
        .into_iter()
        .filter(|(name, _)| name == DATASET_PARAM)
        .map(|(_, value)| value)
        .collect();
    let selected = select_datasets(&state.api, api_key, &requested)
        .await
        .map_err(|e| reject("dataset selection failed", e))?;
    info!(count = selected.len(), "dataset selection confirmed");
    Ok(Json(selected))
}

/// A missing header reads as an empty key. A header that is present but not
/// visible ASCII is a key nobody could have been issued.
fn api_key_from(headers: &HeaderMap) -> Result<&str, ApiRejection> {
    let Some(value) = headers.get(API_KEY_HEADER) else {
        return Ok("");
    };
    value.to_str().map_err(|_| {
        warn!("rejected api key header that is not visible ascii");
        (
            StatusCode::FORBIDDEN,
            Json(ApiError::new(ErrorCode::Forbidden, "invalid api key")),
        )
    })
}

fn reject(context: &'static str, err: ApiError) -> ApiRejection {
    let status = status_for(&err);
    if status.is_server_error() {
        error!(error = %err.message, context, "request failed");
    }
    (status, Json(err))
}

fn status_for(err: &ApiError) -> StatusCode {
    match err.code {
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
