use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;

use neuraladapt_core::budget::UsageBudget;
use neuraladapt_core::llm::PlanModel;
use neuraladapt_core::plan::{
    GenerationError, GenerationOutcome, Generator, ServiceError, StoredWorkoutPlan,
    generate_and_store, generate_for_stored, store,
};
use neuraladapt_core::workout::{WorkoutRequest, validate_request};
use neuraladapt_db::models::FeatureSelectionUpdate;
use neuraladapt_db::queries::feature_selections;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub model: Arc<dyn PlanModel>,
    pub budget: Arc<UsageBudget>,
    pub artifact_dir: Arc<PathBuf>,
    pub user_id: Arc<str>,
}

impl AppState {
    fn generator(&self) -> Generator<'_> {
        Generator {
            model: self.model.as_ref(),
            budget: &self.budget,
            artifact_dir: &self.artifact_dir,
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.into(),
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{err:#}"),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Generation(generation) => match generation {
                GenerationError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
                GenerationError::Schema(_) | GenerationError::Adherence { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                GenerationError::BudgetExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
                GenerationError::Llm(_) => StatusCode::BAD_GATEWAY,
            },
        };
        if status.is_server_error() {
            tracing::warn!(%status, error = %err, "request failed");
        }
        Self {
            status,
            message: format!("{err:#}"),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub plan: StoredWorkoutPlan,
    pub attempts: u32,
}

impl From<GenerationOutcome> for GenerationResponse {
    fn from(outcome: GenerationOutcome) -> Self {
        Self {
            plan: outcome.stored,
            attempts: outcome.attempts,
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/plans", get(list_plans).post(create_plan))
        .route("/api/plans/generate", post(generate_plan))
        .route("/api/plans/{id}", get(get_plan).delete(delete_plan))
        .route("/api/plans/{id}/generate", post(generate_stored_plan))
        .route("/api/plans/{id}/artifact", get(get_artifact))
        .route("/api/features", get(get_features).patch(update_features))
        .route("/api/usage", get(get_usage))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(state: AppState, bind: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr: SocketAddr = format!("{bind}:{port}").parse()?;
    tracing::info!("neuraladapt serve listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("neuraladapt serve shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for Ctrl+C; serving until killed");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn list_plans(State(state): State<AppState>) -> Result<axum::response::Response, AppError> {
    let plans = store::list_plans(&state.pool, &state.user_id)
        .await
        .map_err(AppError::internal)?;
    Ok(Json(plans).into_response())
}

async fn create_plan(
    State(state): State<AppState>,
    payload: Result<Json<WorkoutRequest>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(request) = payload?;
    validate_request(&request).map_err(|e| AppError::bad_request(e.to_string()))?;

    let stored = store::save_request(&state.pool, &state.user_id, &request)
        .await
        .map_err(AppError::internal)?;
    Ok((StatusCode::CREATED, Json(stored)).into_response())
}

async fn generate_plan(
    State(state): State<AppState>,
    payload: Result<Json<WorkoutRequest>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(request) = payload?;
    let outcome =
        generate_and_store(&state.pool, &state.user_id, &request, state.generator()).await?;
    Ok((StatusCode::CREATED, Json(GenerationResponse::from(outcome))).into_response())
}

async fn generate_stored_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<axum::response::Response, AppError> {
    let outcome = generate_for_stored(&state.pool, &state.user_id, &id, state.generator()).await?;
    Ok(Json(GenerationResponse::from(outcome)).into_response())
}

async fn get_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<axum::response::Response, AppError> {
    let plan = store::get_plan(&state.pool, &state.user_id, &id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::not_found(format!("plan {id} not found")))?;
    Ok(Json(plan).into_response())
}

async fn delete_plan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<axum::response::Response, AppError> {
    store::delete_plan(&state.pool, &state.user_id, &id)
        .await
        .map_err(AppError::internal)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}

async fn get_artifact(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<axum::response::Response, AppError> {
    let plan = store::get_plan(&state.pool, &state.user_id, &id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::not_found(format!("plan {id} not found")))?;
    let path = plan
        .artifact_path
        .ok_or_else(|| AppError::not_found(format!("plan {id} has no exported workbook")))?;
    Ok(Json(json!({ "artifactPath": path })).into_response())
}

async fn get_features(State(state): State<AppState>) -> Result<axum::response::Response, AppError> {
    let record = feature_selections::get_feature_selections(&state.pool, &state.user_id)
        .await
        .map_err(AppError::internal)?;
    Ok(Json(record).into_response())
}

async fn update_features(
    State(state): State<AppState>,
    payload: Result<Json<FeatureSelectionUpdate>, JsonRejection>,
) -> Result<axum::response::Response, AppError> {
    let Json(update) = payload?;
    let record = feature_selections::update_feature_selections(&state.pool, &state.user_id, &update)
        .await
        .map_err(AppError::internal)?;
    Ok(Json(record).into_response())
}

async fn get_usage(State(state): State<AppState>) -> Json<neuraladapt_core::budget::UsageSnapshot> {
    Json(state.budget.snapshot())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
