use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::Response,
};
use serde_json::Value as JsonValue;

use crate::db::Database;
use crate::error::StoreError;
use crate::model::CreateBird;
use crate::{assets, created, no_content, server_error, success};

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

/// A path segment that is not an integer never reaches the store; it belongs
/// to the client app, like every other unmatched route.
fn parse_id(raw: &str) -> Option<i32> {
    raw.parse().ok()
}

pub async fn list_birds(State(state): State<AppState>) -> Response {
    match state.db.list_birds().await {
        Ok(birds) => success(birds),
        Err(e) => {
            tracing::error!("failed to list birds: {}", e);
            server_error(e.to_string())
        }
    }
}

pub async fn create_bird(
    State(state): State<AppState>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> Response {
    let value = match payload {
        Ok(Json(value)) => value,
        Err(e) => {
            tracing::error!("rejected create body: {}", e);
            return server_error(e.to_string());
        }
    };

    let input: CreateBird = match serde_json::from_value(value) {
        Ok(input) => input,
        Err(e) => {
            tracing::error!("rejected create payload: {}", e);
            return server_error(e.to_string());
        }
    };

    match state.db.create_bird(input).await {
        Ok(bird) => created(bird),
        Err(e) => {
            tracing::error!("failed to create bird: {}", e);
            server_error(e.to_string())
        }
    }
}

pub async fn get_bird(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let Some(id) = parse_id(&raw_id) else {
        return assets::entry_page();
    };

    match state.db.get_bird(id).await {
        Ok(Some(bird)) => success(bird),
        // An absent record reports as a 500 envelope, not a 404; clients only
        // distinguish success from failure.
        Ok(None) => server_error(StoreError::NotFound(id).to_string()),
        Err(e) => {
            tracing::error!("failed to get bird {}: {}", id, e);
            server_error(e.to_string())
        }
    }
}

pub async fn update_bird(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    payload: Result<Json<JsonValue>, JsonRejection>,
) -> Response {
    let Some(id) = parse_id(&raw_id) else {
        return assets::entry_page();
    };

    let value = match payload {
        Ok(Json(value)) => value,
        Err(e) => {
            tracing::error!("rejected patch body for bird {}: {}", id, e);
            return server_error(e.to_string());
        }
    };

    let Some(patch) = value.as_object() else {
        return server_error("patch body must be a JSON object".to_string());
    };

    match state.db.update_bird(id, patch).await {
        Ok(bird) => success(bird),
        Err(e) => {
            tracing::error!("failed to update bird {}: {}", id, e);
            server_error(e.to_string())
        }
    }
}

pub async fn delete_bird(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let Some(id) = parse_id(&raw_id) else {
        return assets::entry_page();
    };

    match state.db.delete_bird(id).await {
        Ok(()) => no_content(),
        Err(e) => {
            tracing::error!("failed to delete bird {}: {}", id, e);
            server_error(e.to_string())
        }
    }
}
