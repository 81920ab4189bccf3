use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/plan/save", post(handlers::form_save_plan))
        .route("/track/day", post(handlers::form_set_day))
        .route("/track/progress", post(handlers::form_record_progress))
        .route("/theme/toggle", post(handlers::form_toggle_theme))
        .route("/reset", post(handlers::form_reset))
        .route("/api/state", get(handlers::get_state))
        .route("/api/plan/preview", post(handlers::preview_plan))
        .route("/api/plan/save", post(handlers::save_plan))
        .route("/api/track/day", post(handlers::set_day))
        .route("/api/track/progress", post(handlers::record_progress))
        .route("/api/theme/toggle", post(handlers::toggle_theme))
        .route("/api/reset", post(handlers::reset))
        .with_state(state)
}
