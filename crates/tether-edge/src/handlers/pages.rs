//! Static page handlers.

use axum::{
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::assets;

pub async fn index() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, assets::CONTENT_TYPE_HTML),
            (header::CACHE_CONTROL, assets::NO_CACHE),
        ],
        assets::INDEX_HTML,
    )
}

pub async fn offline() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, assets::CONTENT_TYPE_HTML),
            (header::CACHE_CONTROL, assets::IMMUTABLE),
        ],
        assets::OFFLINE_HTML,
    )
}

pub async fn worker_script() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, assets::CONTENT_TYPE_JS),
            (header::CACHE_CONTROL, assets::NO_CACHE),
        ],
        assets::WORKER_JS,
    )
}

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, assets::CONTENT_TYPE_TEXT)],
        "Not Found",
    )
}
