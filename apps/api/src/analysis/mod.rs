// Selfie analysis and product recommendations.
// All model calls go through llm_client; handlers only see the SkinAdvisor trait.

pub mod advisor;
pub mod handlers;
pub mod location;
pub mod products;
pub mod prompts;
pub mod skin;
