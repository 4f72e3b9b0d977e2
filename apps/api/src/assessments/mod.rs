//! The four assessment flows. Each one reads diagnosis history as context,
//! runs its own prompt→call→parse pipeline, and persists into its own
//! table — none of them write to the attribute store.

pub mod handlers;
pub mod prediction;
pub mod prompts;
pub mod recommendation;
pub mod risk;
pub mod symptom_check;

use serde_json::json;

use crate::models::diagnosis::DiagnosisRow;

/// Serializes the diagnosis summary the recommendation and risk prompts embed.
pub fn diagnosis_context(diagnosis: &DiagnosisRow) -> String {
    let data = json!({
        "diagnosis_name": diagnosis.title,
        "symptoms": diagnosis.symptom_description,
        "date": diagnosis.date_diagnosis.format("%Y-%m-%d").to_string(),
    });
    serde_json::to_string_pretty(&data).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn test_diagnosis_context_shape() {
        let diagnosis = DiagnosisRow {
            id: Uuid::new_v4(),
            title: "Flu".to_string(),
            employee_id: Uuid::new_v4(),
            symptom_description: "fever and cough".to_string(),
            date_diagnosis: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        };
        let parsed: serde_json::Value =
            serde_json::from_str(&diagnosis_context(&diagnosis)).unwrap();
        assert_eq!(parsed["diagnosis_name"], "Flu");
        assert_eq!(parsed["symptoms"], "fever and cough");
        assert_eq!(parsed["date"], "2024-03-01");
    }
}
