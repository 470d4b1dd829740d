use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/register", post(handlers::register))
        .route("/api/login", post(handlers::login))
        .route("/api/logout", post(handlers::logout))
        .route("/api/user", get(handlers::get_user))
        .route("/api/user/username", put(handlers::update_username))
        .route("/api/stats", get(handlers::list_stats).post(handlers::create_stat))
        .route("/api/stats/with-items", get(handlers::list_stats_with_items))
        .route(
            "/api/stats/:stat_id",
            put(handlers::update_stat).delete(handlers::delete_stat),
        )
        .route(
            "/api/stats/:stat_id/items",
            get(handlers::list_items).post(handlers::add_items),
        )
        .route(
            "/api/stats/:stat_id/items/:item_id",
            put(handlers::update_item).delete(handlers::delete_item),
        )
        .route("/api/stats/:stat_id/report", get(handlers::get_report))
        .with_state(state)
}
