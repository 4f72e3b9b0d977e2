// Prompt constants for the diagnosis advice flow.
// The JSON shape named in the instruction block is load-bearing: its keys
// must match what the advice parser expects (title/preliminary/treatment/notes).

pub const ADVICE_SYSTEM: &str = "You are a medical assistant AI that provides health \
    diagnosis based on symptoms. You must return structured JSON in key-value pairs.";

pub const ADVICE_MAX_TOKENS: u32 = 2048;
pub const ADVICE_TEMPERATURE: f32 = 0.7;

const ADVICE_SHAPE_INSTRUCTION: &str = "\
Please return the diagnosis strictly as a JSON object with key-value pairs inside the following structure:\n\
{\"title\": {}, \"preliminary\": {}, \"treatment\": {}, \"notes\": {}}. \
Each key (\"title\", \"preliminary\", \"treatment\", and \"notes\") should have a value. \
The \"title\" object must contain a \"diagnosis\" key naming the condition. \
Ensure the response is a valid JSON object.";

/// Assembles the diagnosis prompt in fixed order: configured template,
/// symptom text, serialized employee context, then the shape instruction.
pub fn build_advice_prompt(template: &str, symptoms: &str, employee_context: &str) -> String {
    format!(
        "{template}\n\
         Symptoms: {symptoms}\n\
         Employee Data: {employee_context}\n\
         {ADVICE_SHAPE_INSTRUCTION}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_order_template_symptoms_context_instruction() {
        let prompt = build_advice_prompt("TEMPLATE", "fever and cough", "{\"Gender\": \"male\"}");
        let t = prompt.find("TEMPLATE").unwrap();
        let s = prompt.find("fever and cough").unwrap();
        let c = prompt.find("Gender").unwrap();
        let i = prompt.find("strictly as a JSON object").unwrap();
        assert!(t < s && s < c && c < i);
    }

    #[test]
    fn test_prompt_names_every_expected_key() {
        let prompt = build_advice_prompt("t", "s", "{}");
        for key in ["title", "preliminary", "treatment", "notes"] {
            assert!(prompt.contains(&format!("\"{key}\"")), "missing key {key}");
        }
    }
}
