use crate::errors::AppError;
use crate::models::{
    DayRequest, PlanInputRequest, PlanPreviewResponse, ProgressRequest, ProgressResponse,
    Snapshot,
};
use crate::session::Session;
use crate::state::AppState;
use crate::storage::persist_store;
use crate::track::UpdateMode;
use crate::ui::render_index;
use axum::{
    Form, Json,
    extract::State,
    response::{Html, Redirect},
};
use chrono::Utc;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let session = state.session.lock().await;
    Html(render_index(&session.snapshot()))
}

pub async fn get_state(State(state): State<AppState>) -> Json<Snapshot> {
    let session = state.session.lock().await;
    Json(session.snapshot())
}

pub async fn preview_plan(
    State(state): State<AppState>,
    Json(payload): Json<PlanInputRequest>,
) -> Result<Json<PlanPreviewResponse>, AppError> {
    let mut session = state.session.lock().await;
    let result = session.set_live_inputs(&payload)?;
    persist(&state, &session).await?;

    Ok(Json(PlanPreviewResponse {
        display: result.display(),
        result,
    }))
}

pub async fn save_plan(
    State(state): State<AppState>,
    Json(payload): Json<PlanInputRequest>,
) -> Result<Json<Snapshot>, AppError> {
    let snapshot = apply_save_plan(&state, &payload).await?;
    Ok(Json(snapshot))
}

pub async fn set_day(
    State(state): State<AppState>,
    Json(payload): Json<DayRequest>,
) -> Result<Json<Snapshot>, AppError> {
    let snapshot = apply_set_day(&state, &payload).await?;
    Ok(Json(snapshot))
}

pub async fn record_progress(
    State(state): State<AppState>,
    Json(payload): Json<ProgressRequest>,
) -> Result<Json<ProgressResponse>, AppError> {
    let response = apply_progress(&state, &payload).await?;
    Ok(Json(response))
}

pub async fn toggle_theme(State(state): State<AppState>) -> Result<Json<Snapshot>, AppError> {
    let snapshot = apply_toggle_theme(&state).await?;
    Ok(Json(snapshot))
}

pub async fn reset(State(state): State<AppState>) -> Result<Json<Snapshot>, AppError> {
    let snapshot = apply_reset(&state).await?;
    Ok(Json(snapshot))
}

pub async fn form_save_plan(
    State(state): State<AppState>,
    Form(payload): Form<PlanInputRequest>,
) -> Result<Redirect, AppError> {
    apply_save_plan(&state, &payload).await?;
    Ok(Redirect::to("/"))
}

pub async fn form_set_day(
    State(state): State<AppState>,
    Form(payload): Form<DayRequest>,
) -> Result<Redirect, AppError> {
    apply_set_day(&state, &payload).await?;
    Ok(Redirect::to("/"))
}

pub async fn form_record_progress(
    State(state): State<AppState>,
    Form(payload): Form<ProgressRequest>,
) -> Result<Redirect, AppError> {
    apply_progress(&state, &payload).await?;
    Ok(Redirect::to("/"))
}

pub async fn form_toggle_theme(State(state): State<AppState>) -> Result<Redirect, AppError> {
    apply_toggle_theme(&state).await?;
    Ok(Redirect::to("/"))
}

pub async fn form_reset(State(state): State<AppState>) -> Result<Redirect, AppError> {
    apply_reset(&state).await?;
    Ok(Redirect::to("/"))
}

async fn apply_save_plan(
    state: &AppState,
    payload: &PlanInputRequest,
) -> Result<Snapshot, AppError> {
    let mut session = state.session.lock().await;
    if !payload.is_empty() {
        session.set_live_inputs(payload)?;
    }
    session.save_plan()?;
    persist(state, &session).await?;
    Ok(session.snapshot())
}

async fn apply_set_day(state: &AppState, payload: &DayRequest) -> Result<Snapshot, AppError> {
    let mut session = state.session.lock().await;
    session.set_day(payload.day.as_ref());
    persist(state, &session).await?;
    Ok(session.snapshot())
}

async fn apply_progress(
    state: &AppState,
    payload: &ProgressRequest,
) -> Result<ProgressResponse, AppError> {
    let Some(mode) = UpdateMode::parse(&payload.mode) else {
        return Err(AppError::bad_request("mode must be 'onPage' or 'readPages'"));
    };

    let mut session = state.session.lock().await;
    let update = session.record_progress(mode, payload.value.as_ref(), Utc::now())?;
    persist(state, &session).await?;

    let track = session.track_result();
    Ok(ProgressResponse {
        progress: update.progress,
        entry: update.entry,
        display: track.display(),
        track,
        ambiguous_page_warning: update.ambiguous,
    })
}

async fn apply_toggle_theme(state: &AppState) -> Result<Snapshot, AppError> {
    let mut session = state.session.lock().await;
    session.toggle_theme();
    persist(state, &session).await?;
    Ok(session.snapshot())
}

async fn apply_reset(state: &AppState) -> Result<Snapshot, AppError> {
    let mut session = state.session.lock().await;
    session.reset();
    persist(state, &session).await?;
    Ok(session.snapshot())
}

async fn persist(state: &AppState, session: &Session) -> Result<(), AppError> {
    persist_store(&state.data_path, &session.store).await
}
