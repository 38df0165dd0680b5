//! Household Energy Advisor
//!
//! Classifies a household's monthly consumption against historical norms
//! and returns tailored recommendations:
//! - One-shot advice from `(consumption, people)`
//! - A guided dialogue that collects the same inputs one turn at a time,
//!   with the caller carrying the conversation state between turns
//!
//! PIPELINE:
//! DATASET → STATISTICS → CLASSIFY → RECOMMEND (→ SAVINGS) → RENDER

pub mod api;
pub mod classifier;
pub mod config;
pub mod conversation;
pub mod dataset;
pub mod error;
pub mod extra_tips;
pub mod models;
pub mod recommendations;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use classifier::ConsumptionClassifier;
pub use conversation::ConversationEngine;
pub use dataset::HistoricalDataset;
pub use extra_tips::ExtraTipsMatcher;
pub use recommendations::RecommendationGenerator;

use std::sync::Arc;

/// Load the dataset and build the generator, failing if statistics
/// cannot be computed.
pub fn build_generator(config: &config::AdvisorConfig) -> Result<RecommendationGenerator> {
    let dataset = Arc::new(HistoricalDataset::from_csv_path(&config.dataset_path)?);
    let classifier = ConsumptionClassifier::new(dataset)?;
    Ok(RecommendationGenerator::with_default_price(
        classifier,
        config.default_price_per_kwh,
    ))
}
