//! Prompt context builders: the employee profile object and the historical
//! diagnosis data the assessment flows feed to the model.

use serde_json::{json, Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::diagnosis::attributes::fetch_lines;
use crate::errors::AppError;
use crate::models::diagnosis::{AttributeLineDetail, DiagnosisRow};
use crate::models::employee::EmployeeRow;

/// Serializes the employee profile for the prompt, dropping empty fields so
/// the model only sees data that exists.
pub fn employee_context(employee: &EmployeeRow) -> String {
    let mut fields = Map::new();
    let mut put = |key: &str, value: Option<String>| {
        if let Some(v) = value {
            if !v.trim().is_empty() {
                fields.insert(key.to_string(), Value::String(v));
            }
        }
    };

    put(
        "Date of Birth",
        employee.birthday.map(|d| d.format("%Y-%m-%d").to_string()),
    );
    put("Gender", employee.gender.clone());
    put("Marital Status", employee.marital_status.clone());
    put("Nationality", employee.nationality.clone());
    put("Country of Birth", employee.country_of_birth.clone());
    put("Job Position", employee.job_title.clone());
    put("Department", employee.department.clone());
    put("Emergency Contact", employee.emergency_contact.clone());
    put("Emergency Phone", employee.emergency_phone.clone());
    put(
        "Number of Children",
        employee.children.filter(|c| *c > 0).map(|c| c.to_string()),
    );
    put("Work Location", employee.work_location.clone());
    put("Street", employee.street.clone());
    put("City", employee.city.clone());
    put("State", employee.state.clone());
    put("Zip", employee.zip.clone());
    put("Country", employee.country.clone());
    put("Notes", employee.notes.clone());

    serde_json::to_string_pretty(&Value::Object(fields)).unwrap_or_else(|_| "{}".to_string())
}

/// Loads the employee's diagnosis history as a serialized JSON array of
/// `{date, diagnosis, attributes: [{attribute, values}]}` entries. Only
/// diagnoses with at least one populated attribute line are included.
pub async fn load_history(pool: &PgPool, employee_id: Uuid) -> Result<String, AppError> {
    load_history_keyed(pool, employee_id, "diagnosis").await
}

/// History variant for the outbreak prediction flow, which labels each
/// entry's title field `disease` instead of `diagnosis`.
pub async fn load_prediction_history(
    pool: &PgPool,
    employee_id: Uuid,
) -> Result<String, AppError> {
    load_history_keyed(pool, employee_id, "disease").await
}

async fn load_history_keyed(
    pool: &PgPool,
    employee_id: Uuid,
    title_key: &str,
) -> Result<String, AppError> {
    let diagnoses: Vec<DiagnosisRow> = sqlx::query_as(
        "SELECT id, title, employee_id, symptom_description, date_diagnosis
         FROM diagnoses WHERE employee_id = $1 ORDER BY date_diagnosis",
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await?;

    let mut with_lines = Vec::new();
    for diagnosis in diagnoses {
        let lines = fetch_lines(pool, diagnosis.id).await?;
        with_lines.push((diagnosis, lines));
    }

    let entries = history_entries(&with_lines, title_key);
    serde_json::to_string_pretty(&entries).map_err(|e| AppError::Internal(e.into()))
}

/// Builds the history array from fetched rows. Lines without values are
/// dropped, and diagnoses left with no lines are dropped with them.
fn history_entries(
    diagnoses: &[(DiagnosisRow, Vec<AttributeLineDetail>)],
    title_key: &str,
) -> Value {
    let entries: Vec<Value> = diagnoses
        .iter()
        .filter_map(|(diagnosis, lines)| {
            let attributes: Vec<Value> = lines
                .iter()
                .filter(|line| !line.values.is_empty())
                .map(|line| {
                    json!({
                        "attribute": line.attribute,
                        "values": line.values,
                    })
                })
                .collect();
            if attributes.is_empty() {
                return None;
            }
            let mut entry = Map::new();
            entry.insert(
                "date".to_string(),
                Value::String(diagnosis.date_diagnosis.format("%Y-%m-%d").to_string()),
            );
            entry.insert(
                title_key.to_string(),
                Value::String(diagnosis.title.clone()),
            );
            entry.insert("attributes".to_string(), Value::Array(attributes));
            Some(Value::Object(entry))
        })
        .collect();
    Value::Array(entries)
}
