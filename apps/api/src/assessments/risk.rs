//! Symptom-based risk scoring for a diagnosis.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::assessments::diagnosis_context;
use crate::assessments::prompts::{
    build_risk_prompt, RISK_MAX_TOKENS, RISK_SYSTEM, RISK_TEMPERATURE,
};
use crate::diagnosis::context::load_history;
use crate::errors::AppError;
use crate::llm_client::extract::{extract_json_object, score_field, text_field};
use crate::models::assessment::RiskScoringRow;
use crate::models::diagnosis::DiagnosisRow;
use crate::state::AppState;

pub const DEFAULT_RISK_TITLE: &str = "New Risk Scoring";

#[derive(Debug, PartialEq)]
pub struct ParsedRisk {
    pub risk_score: f64,
    pub escalation_steps: String,
    pub risk_analysis: String,
    pub title: String,
}

pub fn parse_risk(map: &Map<String, Value>) -> ParsedRisk {
    ParsedRisk {
        risk_score: score_field(map, "risk_score"),
        escalation_steps: text_field(map, "escalation_steps", "No escalation steps available"),
        risk_analysis: text_field(map, "risk_analysis", "No risk analysis available"),
        title: text_field(map, "title", DEFAULT_RISK_TITLE),
    }
}

/// Runs the risk scoring flow for one risk record.
pub async fn run_risk_scoring(
    state: &AppState,
    risk_id: Uuid,
) -> Result<RiskScoringRow, AppError> {
    let risk: RiskScoringRow = sqlx::query_as("SELECT * FROM risk_scorings WHERE id = $1")
        .bind(risk_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Risk scoring {risk_id} not found")))?;

    let diagnosis: DiagnosisRow = sqlx::query_as(
        "SELECT id, title, employee_id, symptom_description, date_diagnosis
         FROM diagnoses WHERE id = $1",
    )
    .bind(risk.diagnosis_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Diagnosis {} not found", risk.diagnosis_id)))?;

    let diagnosis_data = diagnosis_context(&diagnosis);
    let historical_data = load_history(&state.db, risk.employee_id).await?;

    let prompt = build_risk_prompt(&diagnosis_data, &historical_data);
    let raw = state
        .llm
        .complete(RISK_SYSTEM, &prompt, RISK_MAX_TOKENS, RISK_TEMPERATURE)
        .await?;

    let parsed = parse_risk(&extract_json_object(&raw)?);

    let updated: RiskScoringRow = sqlx::query_as(
        "UPDATE risk_scorings
         SET title = $1, risk_score = $2, escalation_steps = $3,
             risk_analysis = $4, historical_data = $5
         WHERE id = $6
         RETURNING *",
    )
    .bind(&parsed.title)
    .bind(parsed.risk_score)
    .bind(&parsed.escalation_steps)
    .bind(&parsed.risk_analysis)
    .bind(&historical_data)
    .bind(risk_id)
    .fetch_one(&state.db)
    .await?;

    Ok(updated)
}
