//! Standalone symptom check: no diagnosis record involved, context is the
//! employee name plus the reported symptoms.

use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::assessments::prompts::{
    build_symptom_check_prompt, SYMPTOM_CHECK_MAX_TOKENS, SYMPTOM_CHECK_SYSTEM,
    SYMPTOM_CHECK_TEMPERATURE,
};
use crate::errors::AppError;
use crate::llm_client::extract::{extract_json_object, text_field};
use crate::models::assessment::SymptomCheckRow;
use crate::state::AppState;

#[derive(Debug, PartialEq)]
pub struct ParsedSymptomCheck {
    pub suggested_conditions: String,
    pub recommendation: String,
}

pub fn parse_symptom_check(map: &Map<String, Value>) -> ParsedSymptomCheck {
    ParsedSymptomCheck {
        suggested_conditions: text_field(map, "suggested_conditions", "No conditions suggested"),
        recommendation: text_field(map, "recommendation", "No recommendation available"),
    }
}

fn symptom_data(employee_name: &str, check: &SymptomCheckRow) -> String {
    let data = json!({
        "employee_name": employee_name,
        "symptoms": check.symptom_description,
        "date": check.check_date.format("%Y-%m-%d %H:%M:%S").to_string(),
    });
    serde_json::to_string_pretty(&data).unwrap_or_else(|_| "{}".to_string())
}

/// Runs the symptom check flow for one check record.
pub async fn run_symptom_check(
    state: &AppState,
    check_id: Uuid,
) -> Result<SymptomCheckRow, AppError> {
    let check: SymptomCheckRow = sqlx::query_as("SELECT * FROM symptom_checks WHERE id = $1")
        .bind(check_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Symptom check {check_id} not found")))?;

    if check.symptom_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Please provide the symptom description".to_string(),
        ));
    }

    let (employee_name,): (String,) = sqlx::query_as("SELECT name FROM employees WHERE id = $1")
        .bind(check.employee_id)
        .fetch_one(&state.db)
        .await?;

    let prompt = build_symptom_check_prompt(&symptom_data(&employee_name, &check));
    let raw = state
        .llm
        .complete(
            SYMPTOM_CHECK_SYSTEM,
            &prompt,
            SYMPTOM_CHECK_MAX_TOKENS,
            SYMPTOM_CHECK_TEMPERATURE,
        )
        .await?;

    let parsed = parse_symptom_check(&extract_json_object(&raw)?);

    let updated: SymptomCheckRow = sqlx::query_as(
        "UPDATE symptom_checks
         SET suggested_conditions = $1, recommendation = $2
         WHERE id = $3
         RETURNING *",
    )
    .bind(&parsed.suggested_conditions)
    .bind(&parsed.recommendation)
    .bind(check_id)
    .fetch_one(&state.db)
    .await?;

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symptom_check_defaults() {
        let map = extract_json_object("{}").unwrap();
        let parsed = parse_symptom_check(&map);
        assert_eq!(parsed.suggested_conditions, "No conditions suggested");
        assert_eq!(parsed.recommendation, "No recommendation available");
    }

    #[test]
    fn test_parse_symptom_check_from_prose_reply() {
        let raw = r#"Here are my thoughts. {"suggested_conditions": "Common cold, seasonal flu",
            "recommendation": "Rest and hydrate"} Take care!"#;
        let parsed = parse_symptom_check(&extract_json_object(raw).unwrap());
        assert_eq!(parsed.suggested_conditions, "Common cold, seasonal flu");
        assert_eq!(parsed.recommendation, "Rest and hydrate");
    }
}
