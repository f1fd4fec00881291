// Skin assessment questionnaire: answer model, state machine, rule engine.
// Purely local; no LLM calls happen anywhere under this module.

pub mod answers;
pub mod flow;
pub mod handlers;
pub mod rules;
