use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PredictionRow {
    pub id: Uuid,
    pub title: String,
    pub employee_id: Uuid,
    pub predicted_disease: Option<String>,
    pub region: Option<String>,
    pub prediction_date: DateTime<Utc>,
    pub historical_data: Option<String>,
    pub prediction_result: Option<String>,
    pub accuracy_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecommendationRow {
    pub id: Uuid,
    pub title: String,
    pub employee_id: Uuid,
    pub diagnosis_id: Uuid,
    pub recommendation_date: DateTime<Utc>,
    pub recommendation_result: Option<String>,
    pub lifestyle_suggestion: Option<String>,
    pub preventive_measures: Option<String>,
    pub historical_data: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RiskScoringRow {
    pub id: Uuid,
    pub title: String,
    pub employee_id: Uuid,
    pub diagnosis_id: Uuid,
    pub risk_score: Option<f64>,
    pub escalation_steps: Option<String>,
    pub risk_analysis: Option<String>,
    pub historical_data: Option<String>,
    pub scoring_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SymptomCheckRow {
    pub id: Uuid,
    pub title: String,
    pub employee_id: Uuid,
    pub symptom_description: String,
    pub check_date: DateTime<Utc>,
    pub suggested_conditions: Option<String>,
    pub recommendation: Option<String>,
}
