//! Rule-based recommendation engine for questionnaire answers.
//!
//! One skin-type block fires, then one block per selected concern in
//! enumeration order. Blocks only append; nothing is ranked or deduplicated,
//! so overlapping concerns (aging + dark-spots) repeat "Vitamin C Serum" and "SPF 50".

use serde::{Deserialize, Serialize};

use crate::questionnaire::answers::{AnswerSet, Concern, SkinType};

/// Product categories and care tips derived from an answer set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub products: Vec<String>,
    pub tips: Vec<String>,
}

struct RuleBlock {
    products: &'static [&'static str],
    tips: &'static [&'static str],
}

impl RuleBlock {
    fn apply(&self, out: &mut Recommendation) {
        out.products
            .extend(self.products.iter().map(|p| p.to_string()));
        out.tips.extend(self.tips.iter().map(|t| t.to_string()));
    }
}

fn skin_type_block(skin_type: SkinType) -> &'static RuleBlock {
    match skin_type {
        SkinType::Dry => &RuleBlock {
            products: &[
                "Hyaluronic Acid Serum",
                "Rich Moisturizer",
                "Gentle Cream Cleanser",
            ],
            tips: &["Avoid hot water when cleansing", "Use a humidifier at night"],
        },
        SkinType::Oily => &RuleBlock {
            products: &[
                "Salicylic Acid Cleanser",
                "Oil-Free Moisturizer",
                "Clay Mask",
            ],
            tips: &["Cleanse twice daily", "Use non-comedogenic products"],
        },
        SkinType::Combination => &RuleBlock {
            products: &[
                "Balanced Cleanser",
                "Lightweight Moisturizer",
                "Niacinamide Serum",
            ],
            tips: &["Multi-mask different zones", "Use targeted treatments"],
        },
        SkinType::Sensitive => &RuleBlock {
            products: &[
                "Gentle Cleanser",
                "Fragrance-Free Moisturizer",
                "Soothing Serum",
            ],
            tips: &["Patch test new products", "Avoid harsh exfoliants"],
        },
    }
}

fn concern_block(concern: Concern) -> &'static RuleBlock {
    match concern {
        Concern::Acne => &RuleBlock {
            products: &["BHA Exfoliant", "Benzoyl Peroxide Treatment"],
            tips: &["Change pillowcases regularly", "Avoid touching your face"],
        },
        Concern::Aging => &RuleBlock {
            products: &["Retinol Serum", "Vitamin C Serum", "SPF 50"],
            tips: &["Wear sunscreen daily", "Get adequate sleep"],
        },
        Concern::DarkSpots => &RuleBlock {
            products: &["Vitamin C Serum", "Alpha Arbutin", "SPF 50"],
            tips: &["Always use sun protection", "Be patient with treatments"],
        },
        Concern::Redness => &RuleBlock {
            products: &["Centella Asiatica Serum", "Calming Moisturizer"],
            tips: &["Avoid extreme temperatures", "Use lukewarm water"],
        },
    }
}

/// Evaluates every rule block against `answers`. Age bracket and routine level fire no rules.
pub fn recommend(answers: &AnswerSet) -> Recommendation {
    let mut out = Recommendation::default();
    skin_type_block(answers.skin_type).apply(&mut out);
    for concern in answers.concerns.iter() {
        concern_block(concern).apply(&mut out);
    }
    out
}
