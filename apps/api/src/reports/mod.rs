//! Read-only aggregate reports, each backed by a SQL view created in the
//! initial migration. Nothing here mutates state.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

/// One diagnosis × attribute × value row from `diagnosis_attribute_report`.
/// The left joins leave attribute columns null for diagnoses with no lines.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DiagnosisAttributeReportRow {
    pub diagnosis_id: Uuid,
    pub diagnosis_title: String,
    pub employee_id: Uuid,
    pub date_diagnosis: DateTime<Utc>,
    pub attribute_set: Option<String>,
    pub attribute: Option<String>,
    pub attribute_value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DiseaseOutbreakReportRow {
    pub predicted_disease: String,
    pub total_predictions: i64,
    pub avg_accuracy: Option<f64>,
    pub first_prediction_date: DateTime<Utc>,
    pub last_prediction_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecommendationReportRow {
    pub id: Uuid,
    pub recommendation_date: DateTime<Utc>,
    pub employee_id: Uuid,
    pub diagnosis_id: Uuid,
    pub lifestyle_suggestion: Option<String>,
    pub preventive_measures: Option<String>,
}

/// GET /api/v1/reports/diagnosis-attributes
pub async fn handle_diagnosis_attribute_report(
    State(state): State<AppState>,
) -> Result<Json<Vec<DiagnosisAttributeReportRow>>, AppError> {
    let rows: Vec<DiagnosisAttributeReportRow> = sqlx::query_as(
        "SELECT diagnosis_id, diagnosis_title, employee_id, date_diagnosis,
                attribute_set, attribute, attribute_value
         FROM diagnosis_attribute_report
         ORDER BY date_diagnosis DESC",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// GET /api/v1/reports/disease-outbreaks
pub async fn handle_disease_outbreak_report(
    State(state): State<AppState>,
) -> Result<Json<Vec<DiseaseOutbreakReportRow>>, AppError> {
    let rows: Vec<DiseaseOutbreakReportRow> = sqlx::query_as(
        "SELECT predicted_disease, total_predictions, avg_accuracy,
                first_prediction_date, last_prediction_date
         FROM disease_outbreak_report
         ORDER BY total_predictions DESC",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// GET /api/v1/reports/recommendations
pub async fn handle_recommendation_report(
    State(state): State<AppState>,
) -> Result<Json<Vec<RecommendationReportRow>>, AppError> {
    let rows: Vec<RecommendationReportRow> = sqlx::query_as(
        "SELECT id, recommendation_date, employee_id, diagnosis_id,
                lifestyle_suggestion, preventive_measures
         FROM recommendation_report
         ORDER BY recommendation_date DESC",
    )
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}
