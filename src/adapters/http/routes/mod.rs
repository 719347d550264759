pub mod domain;

use axum::Router;

use crate::adapters::http::app_state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/stores", domain::store_router())
        .nest("/domains", domain::public_router())
}
