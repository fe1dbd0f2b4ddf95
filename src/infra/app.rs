use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{self};
use axum::routing::{get, patch, post};
use axum::{Router, middleware};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use uuid::Uuid;

use crate::adapter::http::docs::{docs_ui, openapi_json};
use crate::adapter::http::middleware::auth::auth_middleware;
use crate::adapter::http::routes::not_found;
use crate::adapter::http::routes::profile::{
    create_my_profile, get_my_profile, get_profile, get_profiles_batch, replace_avatar, replace_my_avatar,
    search_profiles, update_my_profile, update_profile,
};
use crate::infra::config::{AppConfig, StorageProvider};
use crate::infra::state::AppState;

const MAX_AVATAR_UPLOAD: usize = 10 * 1024 * 1024;

fn build_cors(config: &AppConfig) -> CorsLayer {
    let has_wildcard = config.application.allow_origins.iter().any(|s| s == "*");

    if has_wildcard {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([http::Method::POST, http::Method::GET, http::Method::PATCH])
            .allow_headers([CONTENT_TYPE, AUTHORIZATION]);
    }
    let origins: Vec<http::HeaderValue> = config
        .application
        .allow_origins
        .iter()
        .filter_map(|s| {
            s.parse::<http::HeaderValue>()
                .map_err(|e| {
                    tracing::warn!("Failed to parse origin '{}': {}", s, e);
                })
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([http::Method::POST, http::Method::GET, http::Method::PATCH])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

pub fn profile_router(state: AppState) -> Router<AppState> {
    // Static segments win over `{id}` regardless of registration order.
    let public_routes = Router::new()
        .route("/search", get(search_profiles))
        .route("/batch", post(get_profiles_batch))
        .route("/{id}", get(get_profile));

    let protected_routes = Router::new()
        .route("/me", get(get_my_profile).post(create_my_profile).patch(update_my_profile))
        .route("/me/avatar", post(replace_my_avatar).patch(replace_my_avatar))
        .route("/{id}", patch(update_profile))
        .route("/{id}/avatar", post(replace_avatar).patch(replace_avatar))
        .layer(DefaultBodyLimit::max(MAX_AVATAR_UPLOAD))
        .route_layer(middleware::from_fn_with_state(
            state.token_verifier.clone(),
            auth_middleware,
        ));

    Router::new().merge(public_routes).merge(protected_routes)
}

pub fn router(state: AppState) -> Router<AppState> {
    let router = Router::new()
        .nest("/api/profiles", profile_router(state.clone()))
        .route("/openapi.json", get(openapi_json))
        .route("/docs", get(docs_ui))
        .fallback(not_found);

    match (&state.config.storage.provider, &state.config.storage.local) {
        (StorageProvider::Local, Some(local)) => {
            router.nest_service(&local.url_prefix, ServeDir::new(&local.directory))
        }
        _ => router,
    }
}

pub fn create_app(config: &AppConfig, state: AppState) -> Router {
    let cors = build_cors(config);
    Router::new()
        .merge(router(state.clone()))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &http::Request<_>| {
                    let request_id = Uuid::now_v7();
                    tracing::info_span!(
                        "http-request",
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                        request_id = %request_id
                    )
                })
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}
