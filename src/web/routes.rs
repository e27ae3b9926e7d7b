use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;

use super::handlers;

pub fn build_router(state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route("/cameras", get(handlers::cameras))
        .route(
            "/cameras/{camera_uuid}/printer",
            get(handlers::get_printer)
                .put(handlers::set_printer)
                .delete(handlers::remove_printer),
        )
        .route(
            "/cameras/{camera_uuid}/printer/state",
            get(handlers::printer_state),
        )
        .route(
            "/cameras/{camera_uuid}/polling/start",
            post(handlers::start_polling),
        )
        .route(
            "/cameras/{camera_uuid}/polling/stop",
            post(handlers::stop_polling),
        )
        .route("/cameras/{camera_uuid}/suspend", post(handlers::suspend))
        .route("/events", get(handlers::events))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            super::middleware::require_api_token,
        ));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
