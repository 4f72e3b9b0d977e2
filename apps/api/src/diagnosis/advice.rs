//! The diagnosis advice flow: validate, build the prompt, call the model,
//! parse the reply, and upsert the parsed structure into the attribute
//! store — all writes inside one transaction so an upstream or parse
//! failure leaves the diagnosis untouched.

use serde_json::{Map, Value};
use tracing::info;
use uuid::Uuid;

use crate::diagnosis::attributes::apply_attribute_set;
use crate::diagnosis::context::employee_context;
use crate::diagnosis::prompts::{
    build_advice_prompt, ADVICE_MAX_TOKENS, ADVICE_SYSTEM, ADVICE_TEMPERATURE,
};
use crate::errors::AppError;
use crate::llm_client::extract::extract_json_object;
use crate::models::diagnosis::DiagnosisRow;
use crate::models::employee::EmployeeRow;
use crate::state::AppState;

pub const UNKNOWN_DIAGNOSIS_TITLE: &str = "Unknown Diagnosis";

/// The parsed shape of an advice reply: the new diagnosis title plus one
/// payload per attribute set.
#[derive(Debug)]
pub struct ParsedAdvice {
    pub title: String,
    pub sets: Vec<(String, Value)>,
}

/// Splits a decoded advice object into title and attribute-set payloads.
/// The title lives at `title.diagnosis`; every other top-level key is an
/// attribute set.
pub fn parse_advice(map: Map<String, Value>) -> ParsedAdvice {
    let title = map
        .get("title")
        .and_then(|t| t.get("diagnosis"))
        .and_then(|d| d.as_str())
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(UNKNOWN_DIAGNOSIS_TITLE)
        .to_string();

    let sets = map
        .into_iter()
        .filter(|(key, _)| key != "title")
        .collect();

    ParsedAdvice { title, sets }
}

/// Runs the advice flow end to end for one diagnosis.
pub async fn run_health_advice(
    state: &AppState,
    diagnosis_id: Uuid,
) -> Result<DiagnosisRow, AppError> {
    let diagnosis: DiagnosisRow = sqlx::query_as(
        "SELECT id, title, employee_id, symptom_description, date_diagnosis
         FROM diagnoses WHERE id = $1",
    )
    .bind(diagnosis_id)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Diagnosis {diagnosis_id} not found")))?;

    info!("Running health advice for diagnosis '{}'", diagnosis.title);

    if diagnosis.symptom_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Please provide the symptom description".to_string(),
        ));
    }

    let employee: EmployeeRow = sqlx::query_as("SELECT * FROM employees WHERE id = $1")
        .bind(diagnosis.employee_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Employee {} not found", diagnosis.employee_id))
        })?;

    let prompt = build_advice_prompt(
        &state.config.diagnosis_prompt,
        &diagnosis.symptom_description,
        &employee_context(&employee),
    );

    let raw = state
        .llm
        .complete(ADVICE_SYSTEM, &prompt, ADVICE_MAX_TOKENS, ADVICE_TEMPERATURE)
        .await?;

    let advice = parse_advice(extract_json_object(&raw)?);

    let mut tx = state.db.begin().await?;

    sqlx::query("UPDATE diagnoses SET title = $1 WHERE id = $2")
        .bind(&advice.title)
        .bind(diagnosis_id)
        .execute(&mut *tx)
        .await?;

    for (set_name, payload) in &advice.sets {
        apply_attribute_set(&mut *tx, diagnosis_id, set_name, payload).await?;
    }

    tx.commit().await?;

    let updated: DiagnosisRow = sqlx::query_as(
        "SELECT id, title, employee_id, symptom_description, date_diagnosis
         FROM diagnoses WHERE id = $1",
    )
    .bind(diagnosis_id)
    .fetch_one(&state.db)
    .await?;

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_raw(raw: &str) -> ParsedAdvice {
        parse_advice(extract_json_object(raw).unwrap())
    }

    #[test]
    fn test_title_taken_from_title_diagnosis() {
        let advice = parse_raw(r#"{"title": {"diagnosis": "Flu"}, "notes": {}}"#);
        assert_eq!(advice.title, "Flu");
    }

    #[test]
    fn test_missing_title_falls_back() {
        let advice = parse_raw(r#"{"preliminary": {"symptom": "fever"}}"#);
        assert_eq!(advice.title, UNKNOWN_DIAGNOSIS_TITLE);
    }

    #[test]
    fn test_title_without_diagnosis_key_falls_back() {
        let advice = parse_raw(r#"{"title": {"name": "Flu"}}"#);
        assert_eq!(advice.title, UNKNOWN_DIAGNOSIS_TITLE);
    }

    #[test]
    fn test_blank_title_falls_back() {
        let advice = parse_raw(r#"{"title": {"diagnosis": "  "}}"#);
        assert_eq!(advice.title, UNKNOWN_DIAGNOSIS_TITLE);
    }

    #[test]
    fn test_sets_exclude_title_key() {
        let advice = parse_raw(
            r#"{"title": {"diagnosis": "Flu"},
                "preliminary": {"symptom": "fever"},
                "notes": {"severity": "mild"}}"#,
        );
        let names: Vec<&str> = advice.sets.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["preliminary", "notes"]);
    }

    #[test]
    fn test_end_to_end_fixture_from_prose_reply() {
        let raw = concat!(
            "Based on the symptoms, here is my assessment: ",
            r#"{"title": {"diagnosis": "Flu"}, "preliminary": {"symptom": "fever"}, "#,
            r#""notes": {"severity": "mild"}} Feel better soon!"#,
        );
        let advice = parse_raw(raw);
        assert_eq!(advice.title, "Flu");
        assert_eq!(advice.sets.len(), 2);
        assert_eq!(advice.sets[0].0, "preliminary");
        assert_eq!(advice.sets[0].1, json!({"symptom": "fever"}));
        assert_eq!(advice.sets[1].0, "notes");
    }

    mod flow {
        use super::super::*;
        use axum::{http::StatusCode, routing::post, Json, Router};
        use serde_json::json;
        use sqlx::PgPool;

        use crate::config::{Config, DEFAULT_DIAGNOSIS_PROMPT};
        use crate::diagnosis::attributes::fetch_lines;
        use crate::llm_client::{LlmClient, LlmError};

        /// Binds a one-route chat-completions stub on an ephemeral port and
        /// returns its endpoint URL.
        async fn spawn_llm_stub(status: StatusCode, body: Value) -> String {
            let app = Router::new().route(
                "/v1/chat/completions",
                post(move || async move { (status, Json(body)) }),
            );
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
            format!("http://{addr}/v1/chat/completions")
        }

        fn test_state(pool: PgPool, api_url: String) -> AppState {
            let config = Config {
                database_url: String::new(),
                openai_api_key: "test-key".to_string(),
                openai_model: "gpt-test".to_string(),
                openai_api_url: api_url.clone(),
                diagnosis_prompt: DEFAULT_DIAGNOSIS_PROMPT.to_string(),
                llm_timeout_secs: 5,
                port: 0,
                rust_log: "info".to_string(),
            };
            let llm = LlmClient::new(
                "test-key".to_string(),
                "gpt-test".to_string(),
                api_url,
                std::time::Duration::from_secs(5),
            );
            AppState {
                db: pool,
                llm,
                config,
            }
        }

        async fn seed_diagnosis(pool: &PgPool) -> Uuid {
            let (employee_id,): (Uuid,) =
                sqlx::query_as("INSERT INTO employees (name) VALUES ('Ada') RETURNING id")
                    .fetch_one(pool)
                    .await
                    .unwrap();
            let (diagnosis_id,): (Uuid,) = sqlx::query_as(
                "INSERT INTO diagnoses (employee_id, symptom_description)
                 VALUES ($1, 'fever and cough') RETURNING id",
            )
            .bind(employee_id)
            .fetch_one(pool)
            .await
            .unwrap();
            diagnosis_id
        }

        #[sqlx::test]
        async fn test_upstream_failure_leaves_diagnosis_untouched(pool: PgPool) {
            let url = spawn_llm_stub(
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": {"message": "overloaded"}}),
            )
            .await;
            let state = test_state(pool.clone(), url);
            let diagnosis_id = seed_diagnosis(&pool).await;

            let err = run_health_advice(&state, diagnosis_id).await.unwrap_err();
            assert!(matches!(
                err,
                AppError::Llm(LlmError::Upstream { status: 500, .. })
            ));

            let (title,): (String,) = sqlx::query_as("SELECT title FROM diagnoses WHERE id = $1")
                .bind(diagnosis_id)
                .fetch_one(&pool)
                .await
                .unwrap();
            assert_eq!(title, "New Diagnosis");
            assert!(fetch_lines(&pool, diagnosis_id).await.unwrap().is_empty());
        }

        #[sqlx::test]
        async fn test_successful_reply_updates_title_and_lines(pool: PgPool) {
            let content = concat!(
                r#"{"title": {"diagnosis": "Flu"}, "#,
                r#""preliminary": {"symptom": "fever"}, "#,
                r#""notes": {"severity": "mild"}}"#,
            );
            let url = spawn_llm_stub(
                StatusCode::OK,
                json!({"choices": [{"message": {"content": content}}]}),
            )
            .await;
            let state = test_state(pool.clone(), url);
            let diagnosis_id = seed_diagnosis(&pool).await;

            let updated = run_health_advice(&state, diagnosis_id).await.unwrap();
            assert_eq!(updated.title, "Flu");

            let lines = fetch_lines(&pool, diagnosis_id).await.unwrap();
            assert_eq!(lines.len(), 2);
            assert_eq!(lines[0].attribute_set, "notes");
            assert_eq!(lines[0].values, vec!["mild"]);
            assert_eq!(lines[1].attribute_set, "preliminary");
            assert_eq!(lines[1].values, vec!["fever"]);
        }
    }
}
