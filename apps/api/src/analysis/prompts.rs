// All LLM prompt text and response schemas for the analysis module.
// Schema builders come from llm_client::prompts.

use serde_json::Value;

use crate::analysis::location::Coordinates;
use crate::analysis::skin::SkinAnalysisResult;
use crate::llm_client::prompts::{object_schema, string_array_schema, string_schema};

pub const ANALYSIS_PROMPT: &str = "Analyze the person's skin in this selfie. \
    Identify their skin type (e.g., Oily, Dry, Combination, Normal, Sensitive) \
    and list up to 3 primary skin concerns (e.g., Acne, Fine Lines, Hyperpigmentation, Redness, Pores).";

const GENERAL_ADVICE_INSTRUCTION: &str = " Also, provide general environmental skincare advice \
    as the user's location is not available.";

/// Builds the selfie analysis prompt. Location-specific advice is only requested
/// when coordinates are known.
pub fn build_analysis_prompt(location: Option<Coordinates>) -> String {
    let mut prompt = ANALYSIS_PROMPT.to_string();
    match location {
        Some(Coordinates {
            latitude,
            longitude,
        }) => prompt.push_str(&format!(
            " Also, provide skincare advice based on the current weather and environmental \
             conditions for latitude {latitude} and longitude {longitude}. \
             Consider factors like UV index, humidity, and pollution. \
             The advice should be a concise paragraph."
        )),
        None => prompt.push_str(GENERAL_ADVICE_INSTRUCTION),
    }
    prompt
}

pub fn build_recommendation_prompt(analysis: &SkinAnalysisResult) -> String {
    format!(
        "Based on a skin analysis of skin type: {} and concerns: {}, \
         recommend one cleanser, one moisturizer, and one serum. \
         For each product, provide a generic name, a short description, and 3 key ingredients.",
        analysis.skin_type,
        analysis.concerns.join(", ")
    )
}

pub fn analysis_schema() -> Value {
    object_schema(&[
        ("skinType", string_schema()),
        ("concerns", string_array_schema()),
        ("environmentalAdvice", string_schema()),
    ])
}

pub fn product_schema() -> Value {
    object_schema(&[
        ("name", string_schema()),
        ("description", string_schema()),
        ("ingredients", string_array_schema()),
    ])
}

pub fn recommendation_schema() -> Value {
    object_schema(&[
        ("cleanser", product_schema()),
        ("moisturizer", product_schema()),
        ("serum", product_schema()),
    ])
}
