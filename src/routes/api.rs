//! Versioned API routes. Everything except registration and activation
//! requires `X-User-Id`.

use crate::handlers::{daylog, report, tag, user};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(user::register))
        .route("/users/me", get(user::me).delete(user::delete_me))
        .route("/users/activate", post(user::activate))
        .route("/daylogs", get(daylog::list).post(daylog::create))
        .route("/daylogs/year/:year", get(daylog::list_by_year))
        .route(
            "/daylogs/:id",
            get(daylog::get).patch(daylog::update).delete(daylog::delete),
        )
        .route("/tags", get(tag::list).post(tag::create))
        .route("/tags/:id", get(tag::get).patch(tag::update).delete(tag::delete))
        .route("/reports/monthly/:year/:month", get(report::monthly))
        .route("/reports/tags/:tag", get(report::by_tag))
        .route("/reports/moods/:mood", get(report::by_mood))
}
