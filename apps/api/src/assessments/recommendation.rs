//! Personalized health recommendation from a diagnosis plus history.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::assessments::diagnosis_context;
use crate::assessments::prompts::{
    build_recommendation_prompt, RECOMMENDATION_MAX_TOKENS, RECOMMENDATION_SYSTEM,
    RECOMMENDATION_TEMPERATURE,
};
use crate::diagnosis::context::load_history;
use crate::errors::AppError;
use crate::llm_client::extract::{extract_json_object, text_field};
use crate::models::assessment::RecommendationRow;
use crate::models::diagnosis::DiagnosisRow;
use crate::state::AppState;

pub const DEFAULT_RECOMMENDATION_TITLE: &str = "New Health Recommendation";

#[derive(Debug, PartialEq)]
pub struct ParsedRecommendation {
    pub recommendation: String,
    pub lifestyle_suggestion: String,
    pub preventive_measures: String,
    pub title: String,
}

pub fn parse_recommendation(map: &Map<String, Value>) -> ParsedRecommendation {
    ParsedRecommendation {
        recommendation: text_field(map, "recommendation", "No recommendation available"),
        lifestyle_suggestion: text_field(
            map,
            "lifestyle_suggestion",
            "No lifestyle suggestion available",
        ),
        preventive_measures: text_field(
            map,
            "preventive_measures",
            "No preventive measures available",
        ),
        title: text_field(map, "title", DEFAULT_RECOMMENDATION_TITLE),
    }
}

/// Runs the recommendation flow for one recommendation record.
pub async fn run_recommendation(
    state: &AppState,
    recommendation_id: Uuid,
) -> Result<RecommendationRow, AppError> {
    let recommendation: RecommendationRow =
        sqlx::query_as("SELECT * FROM recommendations WHERE id = $1")
            .bind(recommendation_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Recommendation {recommendation_id} not found"))
            })?;

    let diagnosis: DiagnosisRow = sqlx::query_as(
        "SELECT id, title, employee_id, symptom_description, date_diagnosis
         FROM diagnoses WHERE id = $1",
    )
    .bind(recommendation.diagnosis_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| {
        AppError::NotFound(format!(
            "Diagnosis {} not found",
            recommendation.diagnosis_id
        ))
    })?;

    let diagnosis_data = diagnosis_context(&diagnosis);
    let historical_data = load_history(&state.db, recommendation.employee_id).await?;

    let prompt = build_recommendation_prompt(&diagnosis_data, &historical_data);
    let raw = state
        .llm
        .complete(
            RECOMMENDATION_SYSTEM,
            &prompt,
            RECOMMENDATION_MAX_TOKENS,
            RECOMMENDATION_TEMPERATURE,
        )
        .await?;

    let parsed = parse_recommendation(&extract_json_object(&raw)?);

    let updated: RecommendationRow = sqlx::query_as(
        "UPDATE recommendations
         SET title = $1, historical_data = $2, recommendation_result = $3,
             lifestyle_suggestion = $4, preventive_measures = $5
         WHERE id = $6
         RETURNING *",
    )
    .bind(&parsed.title)
    .bind(&historical_data)
    .bind(&parsed.recommendation)
    .bind(&parsed.lifestyle_suggestion)
    .bind(&parsed.preventive_measures)
    .bind(recommendation_id)
    .fetch_one(&state.db)
    .await?;

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recommendation_empty_reply_uses_defaults() {
        let map = extract_json_object("{}").unwrap();
        let parsed = parse_recommendation(&map);
        assert_eq!(parsed.recommendation, "No recommendation available");
        assert_eq!(
            parsed.lifestyle_suggestion,
            "No lifestyle suggestion available"
        );
        assert_eq!(
            parsed.preventive_measures,
            "No preventive measures available"
        );
        assert_eq!(parsed.title, DEFAULT_RECOMMENDATION_TITLE);
    }

    #[test]
    fn test_parse_recommendation_partial_reply_keeps_present_keys() {
        let map = extract_json_object(
            r#"Sure: {"recommendation": "See a physician", "title": "Flu Care"}"#,
        )
        .unwrap();
        let parsed = parse_recommendation(&map);
        assert_eq!(parsed.recommendation, "See a physician");
        assert_eq!(parsed.title, "Flu Care");
        assert_eq!(
            parsed.lifestyle_suggestion,
            "No lifestyle suggestion available"
        );
    }
}
