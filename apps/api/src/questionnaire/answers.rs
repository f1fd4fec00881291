//! Questionnaire answer model: closed categorical values collected across four steps.

#![allow(dead_code)]

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkinType {
    Dry,
    Oily,
    Combination,
    Sensitive,
}

impl SkinType {
    pub const ALL: [SkinType; 4] = [
        SkinType::Dry,
        SkinType::Oily,
        SkinType::Combination,
        SkinType::Sensitive,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SkinType::Dry => "Dry",
            SkinType::Oily => "Oily",
            SkinType::Combination => "Combination",
            SkinType::Sensitive => "Sensitive",
        }
    }
}

/// Declaration order is the order concern rules fire in.
/// `Ord` is derived so a `BTreeSet<Concern>` iterates in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Concern {
    Acne,
    Aging,
    DarkSpots,
    Redness,
}

impl Concern {
    pub const ALL: [Concern; 4] = [
        Concern::Acne,
        Concern::Aging,
        Concern::DarkSpots,
        Concern::Redness,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Concern::Acne => "Acne & Breakouts",
            Concern::Aging => "Fine Lines & Wrinkles",
            Concern::DarkSpots => "Dark Spots",
            Concern::Redness => "Redness & Sensitivity",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeBracket {
    #[serde(rename = "18-25")]
    From18To25,
    #[serde(rename = "26-35")]
    From26To35,
    #[serde(rename = "36-45")]
    From36To45,
    #[serde(rename = "46+")]
    From46,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 4] = [
        AgeBracket::From18To25,
        AgeBracket::From26To35,
        AgeBracket::From36To45,
        AgeBracket::From46,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AgeBracket::From18To25 => "18-25",
            AgeBracket::From26To35 => "26-35",
            AgeBracket::From36To45 => "36-45",
            AgeBracket::From46 => "46+",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutineLevel {
    Minimal,
    Basic,
    Advanced,
    None,
}

impl RoutineLevel {
    pub const ALL: [RoutineLevel; 4] = [
        RoutineLevel::Minimal,
        RoutineLevel::Basic,
        RoutineLevel::Advanced,
        RoutineLevel::None,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RoutineLevel::Minimal => "Minimal",
            RoutineLevel::Basic => "Basic",
            RoutineLevel::Advanced => "Advanced",
            RoutineLevel::None => "None",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            RoutineLevel::Minimal => "Just cleanser and moisturizer",
            RoutineLevel::Basic => "Cleanser, toner, moisturizer, SPF",
            RoutineLevel::Advanced => "Full routine with serums and treatments",
            RoutineLevel::None => "Starting from scratch",
        }
    }
}

/// Selected concerns. Toggling a member removes it, toggling a non-member adds it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConcernSet(BTreeSet<Concern>);

impl ConcernSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, concern: Concern) {
        if !self.0.remove(&concern) {
            self.0.insert(concern);
        }
    }

    pub fn contains(&self, concern: Concern) -> bool {
        self.0.contains(&concern)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates in rule-firing order regardless of selection order.
    pub fn iter(&self) -> impl Iterator<Item = Concern> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Concern> for ConcernSet {
    fn from_iter<I: IntoIterator<Item = Concern>>(iter: I) -> Self {
        ConcernSet(iter.into_iter().collect())
    }
}

/// A completed set of questionnaire answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSet {
    pub skin_type: SkinType,
    pub concerns: ConcernSet,
    pub age_bracket: AgeBracket,
    pub routine_level: RoutineLevel,
}
