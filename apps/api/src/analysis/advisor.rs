//! Skin advisor: pluggable, trait-based front for the AI analysis and recommendation calls.
//!
//! Default: `GeminiAdvisor`, which goes through `LlmClient`.
//! `AppState` holds an `Arc<dyn SkinAdvisor>`.

use async_trait::async_trait;

use crate::analysis::location::Coordinates;
use crate::analysis::products::{get_product_recommendations, ProductRecommendations};
use crate::analysis::skin::{analyze_skin, ImagePayload, SkinAnalysisResult};
use crate::errors::AppError;
use crate::llm_client::LlmClient;

pub const ANALYSIS_FAILED: &str = "Failed to analyze skin. Please try again.";
pub const RECOMMENDATIONS_FAILED: &str = "Could not fetch recommendations. Please try again.";

#[async_trait]
pub trait SkinAdvisor: Send + Sync {
    async fn analyze(
        &self,
        image: &ImagePayload,
        location: Option<Coordinates>,
    ) -> Result<SkinAnalysisResult, AppError>;

    async fn recommend(
        &self,
        analysis: &SkinAnalysisResult,
    ) -> Result<ProductRecommendations, AppError>;
}

pub struct GeminiAdvisor {
    llm: LlmClient,
}

impl GeminiAdvisor {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl SkinAdvisor for GeminiAdvisor {
    async fn analyze(
        &self,
        image: &ImagePayload,
        location: Option<Coordinates>,
    ) -> Result<SkinAnalysisResult, AppError> {
        analyze_skin(image, location, &self.llm)
            .await
            .map_err(|e| AppError::llm(ANALYSIS_FAILED, format!("skin analysis failed: {e}")))
    }

    async fn recommend(
        &self,
        analysis: &SkinAnalysisResult,
    ) -> Result<ProductRecommendations, AppError> {
        get_product_recommendations(analysis, &self.llm)
            .await
            .map_err(|e| {
                AppError::llm(
                    RECOMMENDATIONS_FAILED,
                    format!("product recommendations failed: {e}"),
                )
            })
    }
}

#[cfg(test)]
pub(crate) mod stub {
    //! Canned advisor for handler tests.

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;
    use crate::analysis::products::fixtures;

    #[derive(Default)]
    pub struct StubAdvisor {
        pub fail: bool,
        pub calls: AtomicUsize,
        pub last_location: Mutex<Option<Coordinates>>,
        pub last_mime: Mutex<Option<String>>,
    }

    impl StubAdvisor {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl SkinAdvisor for StubAdvisor {
        async fn analyze(
            &self,
            image: &ImagePayload,
            location: Option<Coordinates>,
        ) -> Result<SkinAnalysisResult, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_location.lock().unwrap() = location;
            *self.last_mime.lock().unwrap() = Some(image.mime_type.clone());
            if self.fail {
                return Err(AppError::llm(ANALYSIS_FAILED, "stub failure"));
            }
            Ok(fixtures::analysis())
        }

        async fn recommend(
            &self,
            _analysis: &SkinAnalysisResult,
        ) -> Result<ProductRecommendations, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::llm(RECOMMENDATIONS_FAILED, "stub failure"));
            }
            Ok(fixtures::recommendations())
        }
    }
}
