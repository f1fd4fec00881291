//! Product recommendations: one cleanser, one moisturizer and one serum per analysis.

use serde::{Deserialize, Serialize};

use crate::analysis::prompts::{build_recommendation_prompt, recommendation_schema};
use crate::analysis::skin::SkinAnalysisResult;
use crate::llm_client::prompts::SKINCARE_SYSTEM;
use crate::llm_client::{LlmClient, LlmError, Part};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub description: String,
    pub ingredients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecommendations {
    pub cleanser: Product,
    pub moisturizer: Product,
    pub serum: Product,
}

impl ProductRecommendations {
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Product)> {
        [
            ("cleanser", &self.cleanser),
            ("moisturizer", &self.moisturizer),
            ("serum", &self.serum),
        ]
        .into_iter()
    }

    pub fn validate(&self) -> Result<(), LlmError> {
        for (slot, product) in self.iter() {
            if product.name.trim().is_empty() {
                return Err(LlmError::Schema(format!("{slot} has no name")));
            }
            if product.ingredients.is_empty() {
                return Err(LlmError::Schema(format!("{slot} lists no ingredients")));
            }
        }
        Ok(())
    }
}

pub async fn get_product_recommendations(
    analysis: &SkinAnalysisResult,
    llm: &LlmClient,
) -> Result<ProductRecommendations, LlmError> {
    let parts = [Part::Text(build_recommendation_prompt(analysis))];
    let recommendations: ProductRecommendations = llm
        .call_json(&parts, Some(SKINCARE_SYSTEM), &recommendation_schema())
        .await?;
    recommendations.validate()?;
    Ok(recommendations)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn product(name: &str) -> Product {
        Product {
            name: name.to_string(),
            description: format!("{name} for daily use"),
            ingredients: vec![
                "Glycerin".to_string(),
                "Ceramides".to_string(),
                "Niacinamide".to_string(),
            ],
        }
    }

    pub fn recommendations() -> ProductRecommendations {
        ProductRecommendations {
            cleanser: product("Gentle Foaming Cleanser"),
            moisturizer: product("Barrier Repair Cream"),
            serum: product("Niacinamide 10% Serum"),
        }
    }

    pub fn analysis() -> SkinAnalysisResult {
        SkinAnalysisResult {
            skin_type: "Combination".to_string(),
            concerns: vec!["Acne".to_string(), "Redness".to_string()],
            environmental_advice: "UV index is high; reapply sunscreen.".to_string(),
        }
    }
}
