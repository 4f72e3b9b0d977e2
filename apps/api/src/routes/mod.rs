pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assessments::handlers as assessments;
use crate::diagnosis::handlers as diagnosis;
use crate::employees;
use crate::reports;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Employees
        .route("/api/v1/employees", post(employees::handle_create_employee))
        .route("/api/v1/employees/:id", get(employees::handle_get_employee))
        // Diagnoses and the AI advice flow
        .route(
            "/api/v1/diagnoses",
            post(diagnosis::handle_create_diagnosis),
        )
        .route("/api/v1/diagnoses/:id", get(diagnosis::handle_get_diagnosis))
        .route(
            "/api/v1/diagnoses/:id/advice",
            post(diagnosis::handle_run_advice),
        )
        .route(
            "/api/v1/diagnoses/:id/report",
            get(diagnosis::handle_download_report),
        )
        // Outbreak predictions
        .route(
            "/api/v1/predictions",
            post(assessments::handle_create_prediction),
        )
        .route(
            "/api/v1/predictions/:id",
            get(assessments::handle_get_prediction),
        )
        .route(
            "/api/v1/predictions/:id/run",
            post(assessments::handle_run_prediction),
        )
        // Recommendations
        .route(
            "/api/v1/recommendations",
            post(assessments::handle_create_recommendation),
        )
        .route(
            "/api/v1/recommendations/:id",
            get(assessments::handle_get_recommendation),
        )
        .route(
            "/api/v1/recommendations/:id/run",
            post(assessments::handle_run_recommendation),
        )
        // Risk scorings
        .route(
            "/api/v1/risk-scorings",
            post(assessments::handle_create_risk_scoring),
        )
        .route(
            "/api/v1/risk-scorings/:id",
            get(assessments::handle_get_risk_scoring),
        )
        .route(
            "/api/v1/risk-scorings/:id/run",
            post(assessments::handle_run_risk_scoring),
        )
        // Symptom checks
        .route(
            "/api/v1/symptom-checks",
            post(assessments::handle_create_symptom_check),
        )
        .route(
            "/api/v1/symptom-checks/:id",
            get(assessments::handle_get_symptom_check),
        )
        .route(
            "/api/v1/symptom-checks/:id/run",
            post(assessments::handle_run_symptom_check),
        )
        // Reporting views
        .route(
            "/api/v1/reports/diagnosis-attributes",
            get(reports::handle_diagnosis_attribute_report),
        )
        .route(
            "/api/v1/reports/disease-outbreaks",
            get(reports::handle_disease_outbreak_report),
        )
        .route(
            "/api/v1/reports/recommendations",
            get(reports::handle_recommendation_report),
        )
        .with_state(state)
}
