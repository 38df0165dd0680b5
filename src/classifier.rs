//! Consumption Classifier
//!
//! Places a household's per-person consumption into a tier relative to the
//! historical population:
//! - Low: below `mean - stddev`
//! - High: above `mean + stddev`
//! - Normal: everything in between, boundaries included

use crate::dataset::HistoricalDataset;
use crate::error::AdvisorError;
use crate::models::{ConsumptionLevel, ConsumptionStatistics};
use crate::Result;
use std::sync::Arc;
use tracing::debug;

impl ConsumptionStatistics {
    pub fn lower_bound(&self) -> f64 {
        self.mean - self.stddev
    }

    pub fn upper_bound(&self) -> f64 {
        self.mean + self.stddev
    }

    /// Tier for a per-person figure; ties land in `Normal`
    pub fn level_for(&self, per_person: f64) -> ConsumptionLevel {
        if per_person > self.upper_bound() {
            ConsumptionLevel::High
        } else if per_person < self.lower_bound() {
            ConsumptionLevel::Low
        } else {
            ConsumptionLevel::Normal
        }
    }

    /// Per-person savings target for a tier. `Low` has none.
    pub fn threshold_for(&self, level: ConsumptionLevel) -> Option<f64> {
        match level {
            ConsumptionLevel::High => Some(self.upper_bound()),
            ConsumptionLevel::Normal => Some(self.lower_bound()),
            ConsumptionLevel::Low => None,
        }
    }
}

/// Classifier bound to a shared historical dataset.
///
/// Statistics are computed once at construction; the dataset never changes.
#[derive(Debug, Clone)]
pub struct ConsumptionClassifier {
    dataset: Arc<HistoricalDataset>,
    stats: ConsumptionStatistics,
}

impl ConsumptionClassifier {
    /// Fails with `InsufficientData` when fewer than two valid records exist.
    pub fn new(dataset: Arc<HistoricalDataset>) -> Result<Self> {
        let stats = dataset.statistics()?;
        Ok(Self { dataset, stats })
    }

    pub fn dataset(&self) -> &HistoricalDataset {
        &self.dataset
    }

    pub fn statistics(&self) -> ConsumptionStatistics {
        self.stats
    }

    pub fn classify(
        &self,
        consumption: f64,
        people: i64,
    ) -> Result<(ConsumptionLevel, ConsumptionStatistics)> {
        let per_person = per_person(consumption, people)?;
        let level = self.stats.level_for(per_person);

        debug!(per_person, level = %level, "Classified consumption");

        Ok((level, self.stats))
    }
}

/// Validated `consumption / people`
pub fn per_person(consumption: f64, people: i64) -> Result<f64> {
    if people <= 0 {
        return Err(AdvisorError::InvalidInput(format!(
            "people must be positive, got {}",
            people
        )));
    }
    if !consumption.is_finite() || consumption < 0.0 {
        return Err(AdvisorError::InvalidInput(format!(
            "consumption must be a non-negative number, got {}",
            consumption
        )));
    }
    Ok(consumption / people as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::sample_dataset;
    use crate::models::ConsumptionRecord;

    fn classifier() -> ConsumptionClassifier {
        ConsumptionClassifier::new(sample_dataset()).unwrap()
    }

    #[test]
    fn test_tiers() {
        let c = classifier();
        assert_eq!(c.classify(50.0, 1).unwrap().0, ConsumptionLevel::Low);
        assert_eq!(c.classify(400.0, 2).unwrap().0, ConsumptionLevel::Normal);
        assert_eq!(c.classify(1000.0, 2).unwrap().0, ConsumptionLevel::High);
    }

    #[test]
    fn test_boundaries_are_normal() {
        let c = classifier();
        // mean 200, stddev 100
        assert_eq!(c.classify(300.0, 1).unwrap().0, ConsumptionLevel::Normal);
        assert_eq!(c.classify(100.0, 1).unwrap().0, ConsumptionLevel::Normal);
        assert_eq!(c.classify(300.5, 1).unwrap().0, ConsumptionLevel::High);
        assert_eq!(c.classify(99.5, 1).unwrap().0, ConsumptionLevel::Low);
    }

    #[test]
    fn test_per_person_is_exact_division() {
        assert_eq!(per_person(300.0, 4).unwrap(), 300.0 / 4.0);
        assert_eq!(per_person(1.0, 3).unwrap(), 1.0 / 3.0);
    }

    #[test]
    fn test_monotonic_in_consumption() {
        let c = classifier();
        let rank = |level: ConsumptionLevel| match level {
            ConsumptionLevel::Low => 0,
            ConsumptionLevel::Normal => 1,
            ConsumptionLevel::High => 2,
        };

        let mut previous = 0;
        let mut consumption = 0.0;
        while consumption <= 1200.0 {
            let current = rank(c.classify(consumption, 3).unwrap().0);
            assert!(current >= previous);
            assert!(current - previous <= 1);
            previous = current;
            consumption += 5.0;
        }
        assert_eq!(previous, 2);
    }

    #[test]
    fn test_rejects_non_positive_people() {
        let c = classifier();
        assert!(matches!(c.classify(100.0, 0), Err(AdvisorError::InvalidInput(_))));
        assert!(matches!(c.classify(100.0, -2), Err(AdvisorError::InvalidInput(_))));
        assert!(matches!(
            c.classify(f64::NAN, 2),
            Err(AdvisorError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_insufficient_dataset_fails_construction() {
        let dataset = Arc::new(HistoricalDataset::from_records(vec![ConsumptionRecord::new(
            1, 100.0,
        )]));
        assert!(matches!(
            ConsumptionClassifier::new(dataset),
            Err(AdvisorError::InsufficientData(1))
        ));
    }

    #[test]
    fn test_thresholds() {
        let stats = classifier().statistics();
        assert_eq!(stats.threshold_for(ConsumptionLevel::High), Some(300.0));
        assert_eq!(stats.threshold_for(ConsumptionLevel::Normal), Some(100.0));
        assert_eq!(stats.threshold_for(ConsumptionLevel::Low), None);
    }
}
