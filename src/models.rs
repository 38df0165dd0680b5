//! Core data models for the energy advisor

use serde::{Deserialize, Serialize};
use std::fmt;

//
// ================= Historical Data =================
//

/// One historical observation: a household's monthly consumption.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    pub people: i64,
    pub consumption: f64,
}

impl ConsumptionRecord {
    pub fn new(people: i64, consumption: f64) -> Self {
        Self { people, consumption }
    }

    /// Records without a positive household size are excluded from statistics
    pub fn is_valid(&self) -> bool {
        self.people > 0
    }

    pub fn per_person(&self) -> f64 {
        self.consumption / self.people as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionStatistics {
    pub mean: f64,
    pub stddev: f64,
}

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ConsumptionLevel {
    Low,
    Normal,
    High,
}

impl ConsumptionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsumptionLevel::Low => "low",
            ConsumptionLevel::Normal => "normal",
            ConsumptionLevel::High => "high",
        }
    }

    /// Label shown to households in replies
    pub fn label(&self) -> &'static str {
        match self {
            ConsumptionLevel::Low => "bajo",
            ConsumptionLevel::Normal => "moderado",
            ConsumptionLevel::High => "alto",
        }
    }
}

impl fmt::Display for ConsumptionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ================= Recommendations =================
//

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavingsEstimate {
    pub kwh_saved: f64,
    pub money_saved: f64,
    pub price_per_kwh: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationBundle {
    pub general: Vec<String>,
    pub specific: Vec<String>,
    pub level: ConsumptionLevel,
    pub stats: ConsumptionStatistics,
    pub per_person: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings: Option<SavingsEstimate>,
}

//
// ================= Conversation =================
//

/// Dialogue progress threaded by the caller between turns.
///
/// `step` stays a plain integer on the wire; the engine validates it on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    #[serde(default)]
    pub step: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub people: Option<u32>,
    #[serde(default)]
    pub consumption: Option<f64>,
    #[serde(default)]
    pub price_per_kwh: Option<f64>,
    #[serde(default)]
    pub details: Option<String>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the initial state. Only the decline and completion
    /// transitions end a dialogue this way.
    pub fn reset() -> Self {
        Self::default()
    }
}

/// Result of a single conversational turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub state: ConversationState,
    pub reply: String,
}

impl TurnOutcome {
    pub fn new(state: ConversationState, reply: impl Into<String>) -> Self {
        Self {
            state,
            reply: reply.into(),
        }
    }
}
