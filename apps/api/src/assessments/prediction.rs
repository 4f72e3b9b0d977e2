//! Disease outbreak prediction over an employee's diagnosis history.

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::assessments::prompts::{
    build_prediction_prompt, PREDICTION_MAX_TOKENS, PREDICTION_SYSTEM, PREDICTION_TEMPERATURE,
};
use crate::diagnosis::context::load_prediction_history;
use crate::errors::AppError;
use crate::llm_client::extract::{extract_json_object, score_field, text_field};
use crate::models::assessment::PredictionRow;
use crate::state::AppState;

pub const DEFAULT_PREDICTION_TITLE: &str = "New Disease Prediction";
pub const UNKNOWN_REGION: &str = "Unknown Region";

#[derive(Debug, PartialEq)]
pub struct ParsedPrediction {
    pub prediction_result: String,
    pub predicted_disease: String,
    pub accuracy: f64,
    pub title: String,
}

/// Resolves the prediction reply's expected keys, substituting the
/// documented defaults for anything missing.
pub fn parse_prediction(map: &Map<String, Value>) -> ParsedPrediction {
    ParsedPrediction {
        prediction_result: text_field(map, "prediction_result", "No significant trends detected"),
        predicted_disease: text_field(map, "predicted_disease", "Unknown"),
        accuracy: score_field(map, "accuracy"),
        title: text_field(map, "title", DEFAULT_PREDICTION_TITLE),
    }
}

/// Runs the prediction flow for one prediction record.
pub async fn run_prediction(
    state: &AppState,
    prediction_id: Uuid,
) -> Result<PredictionRow, AppError> {
    let prediction: PredictionRow =
        sqlx::query_as("SELECT * FROM outbreak_predictions WHERE id = $1")
            .bind(prediction_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Prediction {prediction_id} not found")))?;

    let historical_data = load_prediction_history(&state.db, prediction.employee_id).await?;

    // The region is the employee's work city, refreshed on every run.
    let (city,): (Option<String>,) = sqlx::query_as("SELECT city FROM employees WHERE id = $1")
        .bind(prediction.employee_id)
        .fetch_one(&state.db)
        .await?;
    let region = city
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_REGION.to_string());

    let prompt = build_prediction_prompt(&historical_data);
    let raw = state
        .llm
        .complete(
            PREDICTION_SYSTEM,
            &prompt,
            PREDICTION_MAX_TOKENS,
            PREDICTION_TEMPERATURE,
        )
        .await?;

    let parsed = parse_prediction(&extract_json_object(&raw)?);

    let updated: PredictionRow = sqlx::query_as(
        "UPDATE outbreak_predictions
         SET title = $1, historical_data = $2, prediction_result = $3,
             predicted_disease = $4, accuracy_rate = $5, region = $6
         WHERE id = $7
         RETURNING *",
    )
    .bind(&parsed.title)
    .bind(&historical_data)
    .bind(&parsed.prediction_result)
    .bind(&parsed.predicted_disease)
    .bind(parsed.accuracy)
    .bind(&region)
    .bind(prediction_id)
    .fetch_one(&state.db)
    .await?;

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prediction_full_reply() {
        let map = extract_json_object(
            r#"{"prediction_result": "Flu cluster likely", "predicted_disease": "Influenza",
                "accuracy": "72", "title": "Weekly Outlook"}"#,
        )
        .unwrap();
        let parsed = parse_prediction(&map);
        assert_eq!(parsed.prediction_result, "Flu cluster likely");
        assert_eq!(parsed.predicted_disease, "Influenza");
        assert_eq!(parsed.accuracy, 72.0);
        assert_eq!(parsed.title, "Weekly Outlook");
    }

    #[test]
    fn test_parse_prediction_empty_reply_uses_defaults() {
        let map = extract_json_object("{}").unwrap();
        let parsed = parse_prediction(&map);
        assert_eq!(parsed.prediction_result, "No significant trends detected");
        assert_eq!(parsed.predicted_disease, "Unknown");
        assert_eq!(parsed.accuracy, 0.0);
        assert_eq!(parsed.title, DEFAULT_PREDICTION_TITLE);
    }

    #[test]
    fn test_parse_prediction_qualitative_accuracy() {
        let map = extract_json_object(
            r#"{"accuracy": {"confidence_level": "high"}, "predicted_disease": "Measles"}"#,
        )
        .unwrap();
        assert_eq!(parse_prediction(&map).accuracy, 90.0);
    }
}
