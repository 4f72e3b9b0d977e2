use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DiagnosisRow {
    pub id: Uuid,
    pub title: String,
    pub employee_id: Uuid,
    pub symptom_description: String,
    pub date_diagnosis: DateTime<Utc>,
}

/// One attribute line joined out to its set, attribute, and value names.
/// This is the shape the export, history builder, and detail endpoint read.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttributeLineDetail {
    pub line_id: Uuid,
    pub attribute_set: String,
    pub attribute: String,
    pub values: Vec<String>,
}
