//! Questionnaire state machine.
//!
//! Skin type → concerns → age → routine → results. Every state carries the
//! answers collected so far, so the machine is a plain value that the HTTP
//! layer can hand back to the client and receive again on the next event.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::questionnaire::answers::{AgeBracket, AnswerSet, Concern, ConcernSet, RoutineLevel, SkinType};
use crate::questionnaire::rules::{recommend, Recommendation};

pub const TOTAL_STEPS: u8 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("Select at least one concern to continue")]
    EmptyConcernSelection,

    #[error("Event '{event}' is not valid while {state}")]
    InvalidTransition {
        state: &'static str,
        event: &'static str,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum QuestionnaireState {
    #[default]
    CollectingSkinType,
    CollectingConcerns {
        skin_type: SkinType,
        concerns: ConcernSet,
    },
    CollectingAge {
        skin_type: SkinType,
        concerns: ConcernSet,
    },
    CollectingRoutine {
        skin_type: SkinType,
        concerns: ConcernSet,
        age_bracket: AgeBracket,
    },
    ShowingResults {
        answers: AnswerSet,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum QuestionnaireEvent {
    SelectSkinType { skin_type: SkinType },
    ToggleConcern { concern: Concern },
    Continue,
    SelectAge { age_bracket: AgeBracket },
    SelectRoutine { routine_level: RoutineLevel },
    Restart,
}

impl QuestionnaireEvent {
    fn name(&self) -> &'static str {
        match self {
            QuestionnaireEvent::SelectSkinType { .. } => "select_skin_type",
            QuestionnaireEvent::ToggleConcern { .. } => "toggle_concern",
            QuestionnaireEvent::Continue => "continue",
            QuestionnaireEvent::SelectAge { .. } => "select_age",
            QuestionnaireEvent::SelectRoutine { .. } => "select_routine",
            QuestionnaireEvent::Restart => "restart",
        }
    }
}

impl QuestionnaireState {
    fn name(&self) -> &'static str {
        match self {
            QuestionnaireState::CollectingSkinType => "collecting skin type",
            QuestionnaireState::CollectingConcerns { .. } => "collecting concerns",
            QuestionnaireState::CollectingAge { .. } => "collecting age",
            QuestionnaireState::CollectingRoutine { .. } => "collecting routine",
            QuestionnaireState::ShowingResults { .. } => "showing results",
        }
    }

    /// Applies `event`, returning the next state. `Restart` is accepted everywhere
    /// and discards all answers.
    pub fn transition(self, event: QuestionnaireEvent) -> Result<Self, FlowError> {
        use QuestionnaireEvent as E;
        use QuestionnaireState as S;

        match (self, event) {
            (_, E::Restart) => Ok(S::CollectingSkinType),

            (S::CollectingSkinType, E::SelectSkinType { skin_type }) => Ok(S::CollectingConcerns {
                skin_type,
                concerns: ConcernSet::new(),
            }),

            (
                S::CollectingConcerns {
                    skin_type,
                    mut concerns,
                },
                E::ToggleConcern { concern },
            ) => {
                concerns.toggle(concern);
                Ok(S::CollectingConcerns {
                    skin_type,
                    concerns,
                })
            }

            (
                S::CollectingConcerns {
                    skin_type,
                    concerns,
                },
                E::Continue,
            ) => {
                if concerns.is_empty() {
                    return Err(FlowError::EmptyConcernSelection);
                }
                Ok(S::CollectingAge {
                    skin_type,
                    concerns,
                })
            }

            (
                S::CollectingAge {
                    skin_type,
                    concerns,
                },
                E::SelectAge { age_bracket },
            ) => Ok(S::CollectingRoutine {
                skin_type,
                concerns,
                age_bracket,
            }),

            (
                S::CollectingRoutine {
                    skin_type,
                    concerns,
                    age_bracket,
                },
                E::SelectRoutine { routine_level },
            ) => Ok(S::ShowingResults {
                answers: AnswerSet {
                    skin_type,
                    concerns,
                    age_bracket,
                    routine_level,
                },
            }),

            (state, event) => Err(FlowError::InvalidTransition {
                state: state.name(),
                event: event.name(),
            }),
        }
    }

    /// 1-based question number. Results report the last question.
    pub fn step(&self) -> u8 {
        match self {
            QuestionnaireState::CollectingSkinType => 1,
            QuestionnaireState::CollectingConcerns { .. } => 2,
            QuestionnaireState::CollectingAge { .. } => 3,
            QuestionnaireState::CollectingRoutine { .. } => 4,
            QuestionnaireState::ShowingResults { .. } => TOTAL_STEPS,
        }
    }

    pub fn progress_percent(&self) -> u8 {
        ((u16::from(self.step()) * 100 + u16::from(TOTAL_STEPS) / 2) / u16::from(TOTAL_STEPS)) as u8
    }

    /// Recomputed on every call; results are never cached.
    pub fn recommendation(&self) -> Option<Recommendation> {
        match self {
            QuestionnaireState::ShowingResults { answers } => Some(recommend(answers)),
            _ => None,
        }
    }
}
