// Prompt constants for the four assessment flows. Each instruction block
// names the exact JSON keys its parser expects; token budgets and
// temperatures are fixed per call site.

pub const PREDICTION_SYSTEM: &str = "You are a highly intelligent AI that predicts \
    disease outbreaks based on historical health data.";
pub const PREDICTION_MAX_TOKENS: u32 = 300;
pub const PREDICTION_TEMPERATURE: f32 = 0.5;

pub const RECOMMENDATION_SYSTEM: &str = "You are a highly intelligent AI that provides \
    personalized health recommendations based on medical data.";
pub const RECOMMENDATION_MAX_TOKENS: u32 = 500;
pub const RECOMMENDATION_TEMPERATURE: f32 = 0.7;

pub const RISK_SYSTEM: &str = "You are a highly intelligent AI that calculates risk \
    scores based on symptoms and medical history.";
pub const RISK_MAX_TOKENS: u32 = 500;
pub const RISK_TEMPERATURE: f32 = 0.7;

pub const SYMPTOM_CHECK_SYSTEM: &str = "You are a highly intelligent AI that provides \
    diagnostic suggestions based on symptoms.";
pub const SYMPTOM_CHECK_MAX_TOKENS: u32 = 300;
pub const SYMPTOM_CHECK_TEMPERATURE: f32 = 0.5;

pub fn build_prediction_prompt(historical_data: &str) -> String {
    format!(
        "Here is the historical diagnosis data for the employee:\n\
         {historical_data}\n\
         Based on this data, predict any significant disease outbreak trends for the next week. \
         Please return the prediction as a JSON object with the following structure:\n\
         {{\"prediction_result\": {{}}, \"predicted_disease\": {{}}, \"accuracy\": {{}}, \"title\": {{}}}}.\n\
         Ensure that the \"accuracy\" is a numeric value between 0 and 100, representing a \
         percentage confidence level."
    )
}

pub fn build_recommendation_prompt(diagnosis_data: &str, historical_data: &str) -> String {
    format!(
        "Here is the diagnosis data:\n\
         {diagnosis_data}\n\
         Here is the employee's medical history:\n\
         {historical_data}\n\
         Please provide a detailed health recommendation based on this diagnosis, including \
         lifestyle suggestions and preventive measures. \
         Return the data in the following JSON structure:\n\
         {{\"recommendation\": {{}}, \"lifestyle_suggestion\": {{}}, \"preventive_measures\": {{}}, \"title\": {{}}}}."
    )
}

pub fn build_risk_prompt(diagnosis_data: &str, historical_data: &str) -> String {
    format!(
        "Here is the diagnosis and symptom data:\n\
         {diagnosis_data}\n\
         Here is the employee's medical history:\n\
         {historical_data}\n\
         Based on the above, assign a risk score (0-100) where 0 is no risk and 100 is high risk. \
         Also provide escalation steps for critical cases and a brief analysis of the risk. \
         Return the data in the following JSON structure:\n\
         {{\"risk_score\": {{}}, \"escalation_steps\": {{}}, \"risk_analysis\": {{}}, \"title\": {{}}}}."
    )
}

pub fn build_symptom_check_prompt(symptom_data: &str) -> String {
    format!(
        "Here is the symptom data:\n\
         {symptom_data}\n\
         Based on the symptoms provided, suggest possible conditions and provide a recommendation. \
         Return the data in the following JSON structure:\n\
         {{\"suggested_conditions\": {{}}, \"recommendation\": {{}}}}."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_prompt_names_expected_keys() {
        let prompt = build_prediction_prompt("[]");
        for key in ["prediction_result", "predicted_disease", "accuracy", "title"] {
            assert!(prompt.contains(&format!("\"{key}\"")), "missing key {key}");
        }
    }

    #[test]
    fn test_recommendation_prompt_names_expected_keys() {
        let prompt = build_recommendation_prompt("{}", "[]");
        for key in [
            "recommendation",
            "lifestyle_suggestion",
            "preventive_measures",
            "title",
        ] {
            assert!(prompt.contains(&format!("\"{key}\"")), "missing key {key}");
        }
    }

    #[test]
    fn test_risk_prompt_names_expected_keys() {
        let prompt = build_risk_prompt("{}", "[]");
        for key in ["risk_score", "escalation_steps", "risk_analysis", "title"] {
            assert!(prompt.contains(&format!("\"{key}\"")), "missing key {key}");
        }
    }

    #[test]
    fn test_symptom_check_prompt_names_expected_keys() {
        let prompt = build_symptom_check_prompt("{}");
        for key in ["suggested_conditions", "recommendation"] {
            assert!(prompt.contains(&format!("\"{key}\"")), "missing key {key}");
        }
    }

    #[test]
    fn test_prompts_embed_their_context() {
        assert!(build_prediction_prompt("HIST").contains("HIST"));
        let rec = build_recommendation_prompt("DIAG", "HIST");
        assert!(rec.contains("DIAG") && rec.contains("HIST"));
    }
}
