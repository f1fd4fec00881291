//! Axum route handlers for the questionnaire.
//!
//! The server keeps no questionnaire sessions: the client posts its current
//! state with the next event and receives the new state back.

use axum::{extract::rejection::JsonRejection, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppError;
use crate::questionnaire::answers::{AgeBracket, AnswerSet, Concern, RoutineLevel, SkinType};
use crate::questionnaire::flow::{QuestionnaireEvent, QuestionnaireState, TOTAL_STEPS};
use crate::questionnaire::rules::{recommend, Recommendation};

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    #[serde(default)]
    pub state: QuestionnaireState,
    pub event: QuestionnaireEvent,
}

#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub state: QuestionnaireState,
    pub step: u8,
    pub total_steps: u8,
    pub progress_percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
}

impl From<QuestionnaireState> for TransitionResponse {
    fn from(state: QuestionnaireState) -> Self {
        TransitionResponse {
            step: state.step(),
            total_steps: TOTAL_STEPS,
            progress_percent: state.progress_percent(),
            recommendation: state.recommendation(),
            state,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OptionItem {
    pub id: serde_json::Value,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub skin_types: Vec<OptionItem>,
    pub concerns: Vec<OptionItem>,
    pub age_brackets: Vec<OptionItem>,
    pub routine_levels: Vec<OptionItem>,
}

fn option<T: Serialize>(id: T, label: &'static str, description: Option<&'static str>) -> OptionItem {
    OptionItem {
        id: serde_json::to_value(id).unwrap_or_default(),
        label,
        description,
    }
}

/// GET /api/v1/questionnaire/options
pub async fn handle_options() -> Json<OptionsResponse> {
    Json(OptionsResponse {
        skin_types: SkinType::ALL
            .iter()
            .map(|s| option(s, s.label(), None))
            .collect(),
        concerns: Concern::ALL
            .iter()
            .map(|c| option(c, c.label(), None))
            .collect(),
        age_brackets: AgeBracket::ALL
            .iter()
            .map(|a| option(a, a.label(), None))
            .collect(),
        routine_levels: RoutineLevel::ALL
            .iter()
            .map(|r| option(r, r.label(), Some(r.description())))
            .collect(),
    })
}

/// POST /api/v1/questionnaire/transition
pub async fn handle_transition(
    payload: Result<Json<TransitionRequest>, JsonRejection>,
) -> Result<Json<TransitionResponse>, AppError> {
    let Json(req) = payload?;
    let next = req.state.transition(req.event)?;
    debug!("Questionnaire moved to step {}", next.step());
    Ok(Json(next.into()))
}

/// POST /api/v1/questionnaire/recommend
pub async fn handle_recommend(
    payload: Result<Json<AnswerSet>, JsonRejection>,
) -> Result<Json<Recommendation>, AppError> {
    let Json(answers) = payload?;
    Ok(Json(recommend(&answers)))
}
