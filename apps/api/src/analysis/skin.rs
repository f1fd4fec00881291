//! Selfie analysis: skin type, concerns and environmental advice from one image.

use base64::Engine;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::analysis::location::Coordinates;
use crate::analysis::prompts::{analysis_schema, build_analysis_prompt};
use crate::llm_client::prompts::SKINCARE_SYSTEM;
use crate::llm_client::{InlineData, LlmClient, LlmError, Part};

/// Structured assessment returned by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkinAnalysisResult {
    pub skin_type: String,
    pub concerns: Vec<String>,
    pub environmental_advice: String,
}

impl SkinAnalysisResult {
    /// Serde already guarantees the shape; this rejects blank values the schema allows.
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.skin_type.trim().is_empty() {
            return Err(LlmError::Schema("skinType is empty".to_string()));
        }
        if self.environmental_advice.trim().is_empty() {
            return Err(LlmError::Schema("environmentalAdvice is empty".to_string()));
        }
        if self.concerns.iter().any(|c| c.trim().is_empty()) {
            return Err(LlmError::Schema("concerns contains a blank entry".to_string()));
        }
        Ok(())
    }
}

/// An uploaded selfie.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub mime_type: String,
    pub bytes: Bytes,
}

impl ImagePayload {
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    fn to_part(&self) -> Part {
        Part::InlineData(InlineData {
            mime_type: self.mime_type.clone(),
            data: self.to_base64(),
        })
    }
}

/// Sends the image and prompt to the model in one call and validates the result.
pub async fn analyze_skin(
    image: &ImagePayload,
    location: Option<Coordinates>,
    llm: &LlmClient,
) -> Result<SkinAnalysisResult, LlmError> {
    let parts = [image.to_part(), Part::Text(build_analysis_prompt(location))];
    let result: SkinAnalysisResult = llm
        .call_json(&parts, Some(SKINCARE_SYSTEM), &analysis_schema())
        .await?;
    result.validate()?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_camel_case_model_output() {
        let json = r#"{
            "skinType": "Oily",
            "concerns": ["Acne", "Pores"],
            "environmentalAdvice": "High humidity today; use a light gel moisturizer."
        }"#;
        let result: SkinAnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.skin_type, "Oily");
        assert_eq!(result.concerns, vec!["Acne", "Pores"]);
        assert!(result.validate().is_ok());
    }

    #[test]
    fn test_missing_field_is_a_parse_error() {
        let json = r#"{"skinType": "Dry", "concerns": []}"#;
        assert!(serde_json::from_str::<SkinAnalysisResult>(json).is_err());
    }

    #[test]
    fn test_blank_skin_type_fails_validation() {
        let result = SkinAnalysisResult {
            skin_type: "  ".to_string(),
            concerns: vec![],
            environmental_advice: "Stay hydrated.".to_string(),
        };
        assert!(matches!(result.validate(), Err(LlmError::Schema(_))));
    }

    #[test]
    fn test_empty_concern_list_is_allowed() {
        let result = SkinAnalysisResult {
            skin_type: "Normal".to_string(),
            concerns: vec![],
            environmental_advice: "Stay hydrated.".to_string(),
        };
        assert!(result.validate().is_ok());
    }

    #[test]
    fn test_image_part_is_base64_inline_data() {
        let image = ImagePayload {
            mime_type: "image/jpeg".to_string(),
            bytes: Bytes::from_static(b"\xff\xd8\xff"),
        };
        assert_eq!(image.to_base64(), "/9j/");
        let value = serde_json::to_value(image.to_part()).unwrap();
        assert_eq!(value["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(value["inline_data"]["data"], "/9j/");
    }
}
