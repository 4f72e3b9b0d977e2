use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::diagnosis::advice::run_health_advice;
use crate::diagnosis::attributes::fetch_lines;
use crate::diagnosis::export::build_workbook;
use crate::errors::AppError;
use crate::models::diagnosis::{AttributeLineDetail, DiagnosisRow};
use crate::state::AppState;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Title substituted at creation when the client sends none; the advice flow
/// overwrites it with the model's diagnosis later.
pub const AUTO_GENERATED_TITLE: &str = "Auto-Generated Diagnosis";

fn resolve_title(title: Option<String>) -> String {
    title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| AUTO_GENERATED_TITLE.to_string())
}

#[derive(Debug, Deserialize)]
pub struct CreateDiagnosisRequest {
    pub employee_id: Uuid,
    pub title: Option<String>,
    pub symptom_description: String,
}

#[derive(Debug, Serialize)]
pub struct DiagnosisDetailResponse {
    pub diagnosis: DiagnosisRow,
    pub attribute_lines: Vec<AttributeLineDetail>,
}

/// POST /api/v1/diagnoses
pub async fn handle_create_diagnosis(
    State(state): State<AppState>,
    Json(req): Json<CreateDiagnosisRequest>,
) -> Result<Json<DiagnosisRow>, AppError> {
    if req.symptom_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Please provide the symptom description".to_string(),
        ));
    }

    let title = resolve_title(req.title);

    let diagnosis: DiagnosisRow = sqlx::query_as(
        "INSERT INTO diagnoses (title, employee_id, symptom_description)
         VALUES ($1, $2, $3)
         RETURNING id, title, employee_id, symptom_description, date_diagnosis",
    )
    .bind(&title)
    .bind(req.employee_id)
    .bind(&req.symptom_description)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(diagnosis))
}

/// GET /api/v1/diagnoses/:id
pub async fn handle_get_diagnosis(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DiagnosisDetailResponse>, AppError> {
    let diagnosis = fetch_diagnosis(&state, id).await?;
    let attribute_lines = fetch_lines(&state.db, id).await?;
    Ok(Json(DiagnosisDetailResponse {
        diagnosis,
        attribute_lines,
    }))
}

/// POST /api/v1/diagnoses/:id/advice
pub async fn handle_run_advice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DiagnosisDetailResponse>, AppError> {
    let diagnosis = run_health_advice(&state, id).await?;
    let attribute_lines = fetch_lines(&state.db, id).await?;
    Ok(Json(DiagnosisDetailResponse {
        diagnosis,
        attribute_lines,
    }))
}

/// GET /api/v1/diagnoses/:id/report — the .xlsx attribute report.
pub async fn handle_download_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let diagnosis = fetch_diagnosis(&state, id).await?;
    let lines = fetch_lines(&state.db, id).await?;
    let buffer = build_workbook(&lines)?;

    let disposition = format!("attachment; filename=Diagnosis_Report_{}.xlsx", diagnosis.id);
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        buffer,
    )
        .into_response())
}

async fn fetch_diagnosis(state: &AppState, id: Uuid) -> Result<DiagnosisRow, AppError> {
    sqlx::query_as(
        "SELECT id, title, employee_id, symptom_description, date_diagnosis
         FROM diagnoses WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Diagnosis {id} not found")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_title_passes_through_given_title() {
        assert_eq!(resolve_title(Some("Migraine".to_string())), "Migraine");
    }

    #[test]
    fn test_resolve_title_substitutes_when_absent() {
        assert_eq!(resolve_title(None), AUTO_GENERATED_TITLE);
    }

    #[test]
    fn test_resolve_title_substitutes_when_blank() {
        assert_eq!(resolve_title(Some("   ".to_string())), AUTO_GENERATED_TITLE);
    }
}
