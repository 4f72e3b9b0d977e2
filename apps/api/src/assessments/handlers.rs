use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::assessments::prediction::run_prediction;
use crate::assessments::recommendation::run_recommendation;
use crate::assessments::risk::run_risk_scoring;
use crate::assessments::symptom_check::run_symptom_check;
use crate::errors::AppError;
use crate::models::assessment::{
    PredictionRow, RecommendationRow, RiskScoringRow, SymptomCheckRow,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreatePredictionRequest {
    pub employee_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CreateDiagnosisAssessmentRequest {
    pub employee_id: Uuid,
    pub diagnosis_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CreateSymptomCheckRequest {
    pub employee_id: Uuid,
    pub symptom_description: String,
}

/// POST /api/v1/predictions
pub async fn handle_create_prediction(
    State(state): State<AppState>,
    Json(req): Json<CreatePredictionRequest>,
) -> Result<Json<PredictionRow>, AppError> {
    let row: PredictionRow = sqlx::query_as(
        "INSERT INTO outbreak_predictions (employee_id) VALUES ($1) RETURNING *",
    )
    .bind(req.employee_id)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(row))
}

/// POST /api/v1/predictions/:id/run
pub async fn handle_run_prediction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PredictionRow>, AppError> {
    Ok(Json(run_prediction(&state, id).await?))
}

/// GET /api/v1/predictions/:id
pub async fn handle_get_prediction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PredictionRow>, AppError> {
    let row: PredictionRow = sqlx::query_as("SELECT * FROM outbreak_predictions WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Prediction {id} not found")))?;
    Ok(Json(row))
}

/// POST /api/v1/recommendations
pub async fn handle_create_recommendation(
    State(state): State<AppState>,
    Json(req): Json<CreateDiagnosisAssessmentRequest>,
) -> Result<Json<RecommendationRow>, AppError> {
    ensure_diagnosis_belongs_to_employee(&state, req.diagnosis_id, req.employee_id).await?;
    let row: RecommendationRow = sqlx::query_as(
        "INSERT INTO recommendations (employee_id, diagnosis_id) VALUES ($1, $2) RETURNING *",
    )
    .bind(req.employee_id)
    .bind(req.diagnosis_id)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(row))
}

/// POST /api/v1/recommendations/:id/run
pub async fn handle_run_recommendation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecommendationRow>, AppError> {
    Ok(Json(run_recommendation(&state, id).await?))
}

/// GET /api/v1/recommendations/:id
pub async fn handle_get_recommendation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RecommendationRow>, AppError> {
    let row: RecommendationRow = sqlx::query_as("SELECT * FROM recommendations WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Recommendation {id} not found")))?;
    Ok(Json(row))
}

/// POST /api/v1/risk-scorings
pub async fn handle_create_risk_scoring(
    State(state): State<AppState>,
    Json(req): Json<CreateDiagnosisAssessmentRequest>,
) -> Result<Json<RiskScoringRow>, AppError> {
    ensure_diagnosis_belongs_to_employee(&state, req.diagnosis_id, req.employee_id).await?;
    let row: RiskScoringRow = sqlx::query_as(
        "INSERT INTO risk_scorings (employee_id, diagnosis_id) VALUES ($1, $2) RETURNING *",
    )
    .bind(req.employee_id)
    .bind(req.diagnosis_id)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(row))
}

/// POST /api/v1/risk-scorings/:id/run
pub async fn handle_run_risk_scoring(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RiskScoringRow>, AppError> {
    Ok(Json(run_risk_scoring(&state, id).await?))
}

/// GET /api/v1/risk-scorings/:id
pub async fn handle_get_risk_scoring(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RiskScoringRow>, AppError> {
    let row: RiskScoringRow = sqlx::query_as("SELECT * FROM risk_scorings WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Risk scoring {id} not found")))?;
    Ok(Json(row))
}

/// POST /api/v1/symptom-checks
pub async fn handle_create_symptom_check(
    State(state): State<AppState>,
    Json(req): Json<CreateSymptomCheckRequest>,
) -> Result<Json<SymptomCheckRow>, AppError> {
    if req.symptom_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Please provide the symptom description".to_string(),
        ));
    }
    let row: SymptomCheckRow = sqlx::query_as(
        "INSERT INTO symptom_checks (employee_id, symptom_description) VALUES ($1, $2) RETURNING *",
    )
    .bind(req.employee_id)
    .bind(&req.symptom_description)
    .fetch_one(&state.db)
    .await?;
    Ok(Json(row))
}

/// POST /api/v1/symptom-checks/:id/run
pub async fn handle_run_symptom_check(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SymptomCheckRow>, AppError> {
    Ok(Json(run_symptom_check(&state, id).await?))
}

/// GET /api/v1/symptom-checks/:id
pub async fn handle_get_symptom_check(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SymptomCheckRow>, AppError> {
    let row: SymptomCheckRow = sqlx::query_as("SELECT * FROM symptom_checks WHERE id = $1")
        .bind(id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Symptom check {id} not found")))?;
    Ok(Json(row))
}

async fn ensure_diagnosis_belongs_to_employee(
    state: &AppState,
    diagnosis_id: Uuid,
    employee_id: Uuid,
) -> Result<(), AppError> {
    let found: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM diagnoses WHERE id = $1 AND employee_id = $2")
            .bind(diagnosis_id)
            .bind(employee_id)
            .fetch_optional(&state.db)
            .await?;
    found.map(|_| ()).ok_or_else(|| {
        AppError::Validation(format!(
            "Diagnosis {diagnosis_id} does not belong to employee {employee_id}"
        ))
    })
}
