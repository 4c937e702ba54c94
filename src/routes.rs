use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::handler;
use crate::handler::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/birds", get(handler::list_birds))
        .route("/birds", post(handler::create_bird))
        .route("/birds/:id", get(handler::get_bird))
        .route("/birds/:id", patch(handler::update_bird))
        .route("/birds/:id", delete(handler::delete_bird))
}
