//! Recommendation Generator
//!
//! Turns a classified household into general habits, tier-specific advice
//! and, for `normal` and `high` tiers, an estimate of what reaching the
//! tier's threshold would save.

use crate::classifier::{self, ConsumptionClassifier};
use crate::config::DEFAULT_PRICE_PER_KWH;
use crate::error::AdvisorError;
use crate::models::{
    ConsumptionLevel, ConsumptionStatistics, RecommendationBundle, SavingsEstimate,
};
use crate::Result;
use tracing::{debug, info};

/// Habit tips shared by every tier, in display order
const GENERAL_TIPS: &[&str] = &[
    "Apaga las luces cuando no estés en la habitación",
    "Utiliza bombillas LED de bajo consumo",
    "Desconecta los aparatos electrónicos cuando no los uses",
    "Aprovecha la luz natural durante el día",
];

const HIGH_TIPS: &[&str] = &[
    "Tu consumo es alto. Considera estas acciones adicionales:",
    "Revisa el aislamiento de tu hogar",
    "Programa el termostato a temperaturas más eficientes",
    "Realiza una auditoría energética de tu hogar",
];

const NORMAL_TIPS: &[&str] = &[
    "Tu consumo es moderado. Puedes mejorarlo con estas acciones:",
    "Usa electrodomésticos en horas valle",
    "Instala temporizadores en equipos de alto consumo",
];

const LOW_TIPS: &[&str] = &[
    "¡Excelente! Tu consumo es bajo. Para mantenerlo:",
    "Continúa con tus buenos hábitos de consumo",
    "Considera instalar paneles solares para ser aún más eficiente",
];

fn tier_tips(level: ConsumptionLevel) -> &'static [&'static str] {
    match level {
        ConsumptionLevel::High => HIGH_TIPS,
        ConsumptionLevel::Normal => NORMAL_TIPS,
        ConsumptionLevel::Low => LOW_TIPS,
    }
}

fn per_person_line(level: ConsumptionLevel, per_person: f64) -> String {
    match level {
        ConsumptionLevel::High => format!(
            "El consumo por persona es {:.2} kWh, considera reducirlo",
            per_person
        ),
        ConsumptionLevel::Normal | ConsumptionLevel::Low => {
            format!("El consumo por persona es {:.2} kWh", per_person)
        }
    }
}

fn savings_line(level: ConsumptionLevel, threshold: f64, savings: &SavingsEstimate) -> String {
    let target = match level {
        ConsumptionLevel::High => "al límite del consumo alto",
        _ => "al nivel de los hogares más eficientes",
    };
    format!(
        "Si bajas tu consumo {} ({:.2} kWh por persona), ahorrarías {:.2} kWh al mes, \
         unos {:.2} en tu factura (a {:.2} por kWh)",
        target, threshold, savings.kwh_saved, savings.money_saved, savings.price_per_kwh
    )
}

/// Savings from bringing per-person use down to the tier threshold.
///
/// `None` for `low`, and whenever the excess is not positive.
pub fn estimate_savings(
    level: ConsumptionLevel,
    stats: &ConsumptionStatistics,
    per_person: f64,
    people: i64,
    price_per_kwh: f64,
) -> Option<(f64, SavingsEstimate)> {
    let threshold = stats.threshold_for(level)?;
    let excess_per_person = per_person - threshold;
    if excess_per_person <= 0.0 {
        return None;
    }

    let kwh_saved = excess_per_person * people as f64;
    Some((
        threshold,
        SavingsEstimate {
            kwh_saved,
            money_saved: kwh_saved * price_per_kwh,
            price_per_kwh,
        },
    ))
}

pub struct RecommendationGenerator {
    classifier: ConsumptionClassifier,
    default_price_per_kwh: f64,
}

impl RecommendationGenerator {
    pub fn new(classifier: ConsumptionClassifier) -> Self {
        Self::with_default_price(classifier, DEFAULT_PRICE_PER_KWH)
    }

    pub fn with_default_price(classifier: ConsumptionClassifier, default_price_per_kwh: f64) -> Self {
        Self {
            classifier,
            default_price_per_kwh,
        }
    }

    pub fn classifier(&self) -> &ConsumptionClassifier {
        &self.classifier
    }

    pub fn default_price_per_kwh(&self) -> f64 {
        self.default_price_per_kwh
    }

    /// Build the full bundle for a household at the given price
    pub fn recommend(
        &self,
        consumption: f64,
        people: i64,
        price_per_kwh: f64,
    ) -> Result<RecommendationBundle> {
        if !price_per_kwh.is_finite() || price_per_kwh <= 0.0 {
            return Err(AdvisorError::InvalidInput(format!(
                "price per kWh must be positive, got {}",
                price_per_kwh
            )));
        }

        let (level, stats) = self.classifier.classify(consumption, people)?;
        let per_person = classifier::per_person(consumption, people)?;

        let general = GENERAL_TIPS.iter().map(|t| t.to_string()).collect();

        let mut specific: Vec<String> = tier_tips(level).iter().map(|t| t.to_string()).collect();
        specific.push(per_person_line(level, per_person));

        let savings = estimate_savings(level, &stats, per_person, people, price_per_kwh);
        if let Some((threshold, estimate)) = &savings {
            specific.push(savings_line(level, *threshold, estimate));
        }

        debug!(
            level = %level,
            per_person,
            has_savings = savings.is_some(),
            "Recommendations generated"
        );

        Ok(RecommendationBundle {
            general,
            specific,
            level,
            stats,
            per_person,
            savings: savings.map(|(_, estimate)| estimate),
        })
    }

    /// `recommend` with the configured price when the caller gave none
    pub fn recommend_with_optional_price(
        &self,
        consumption: f64,
        people: i64,
        price_per_kwh: Option<f64>,
    ) -> Result<RecommendationBundle> {
        self.recommend(
            consumption,
            people,
            price_per_kwh.unwrap_or(self.default_price_per_kwh),
        )
    }

    /// One-shot advice path: both figures must be strictly positive
    pub fn advise(&self, consumption: f64, people: i64) -> Result<RecommendationBundle> {
        if consumption.is_nan() || consumption <= 0.0 || people <= 0 {
            return Err(AdvisorError::InvalidInput(
                "Los valores deben ser mayores que 0".to_string(),
            ));
        }

        info!(consumption, people, "One-shot advice requested");
        self.recommend_with_optional_price(consumption, people, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::sample_dataset;

    // mean 200, stddev 100 per person
    fn generator() -> RecommendationGenerator {
        RecommendationGenerator::new(ConsumptionClassifier::new(sample_dataset()).unwrap())
    }

    #[test]
    fn test_general_tips_identical_across_tiers() {
        let g = generator();
        let low = g.recommend(50.0, 1, 1000.0).unwrap();
        let high = g.recommend(900.0, 1, 1000.0).unwrap();
        assert_eq!(low.general, high.general);
        assert_eq!(low.general.len(), 4);
        assert_eq!(low.general[0], "Apaga las luces cuando no estés en la habitación");
    }

    #[test]
    fn test_low_tier_has_no_savings() {
        let bundle = generator().recommend(50.0, 1, 1000.0).unwrap();
        assert_eq!(bundle.level, ConsumptionLevel::Low);
        assert!(bundle.savings.is_none());
        assert_eq!(bundle.specific.len(), LOW_TIPS.len() + 1);
        assert_eq!(
            bundle.specific.last().unwrap(),
            "El consumo por persona es 50.00 kWh"
        );
    }

    #[test]
    fn test_high_tier_savings() {
        let bundle = generator().recommend(400.0, 1, 1000.0).unwrap();
        assert_eq!(bundle.level, ConsumptionLevel::High);

        let savings = bundle.savings.unwrap();
        assert_eq!(savings.kwh_saved, 100.0);
        assert_eq!(savings.money_saved, 100_000.0);

        let line = bundle.specific.last().unwrap();
        assert!(line.contains("100.00 kWh al mes"));
        assert!(line.contains("100000.00"));
        assert!(line.contains("a 1000.00 por kWh"));
    }

    #[test]
    fn test_normal_tier_savings_against_lower_bound() {
        // 250 per person, target 100, two people
        let bundle = generator().recommend(500.0, 2, 0.5).unwrap();
        assert_eq!(bundle.level, ConsumptionLevel::Normal);

        let savings = bundle.savings.unwrap();
        assert_eq!(savings.kwh_saved, 300.0);
        assert_eq!(savings.money_saved, 150.0);
        assert!(bundle.specific.last().unwrap().contains("150.00"));
    }

    #[test]
    fn test_no_savings_line_at_threshold() {
        // exactly on the lower bound: normal tier, zero excess
        let bundle = generator().recommend(100.0, 1, 1000.0).unwrap();
        assert_eq!(bundle.level, ConsumptionLevel::Normal);
        assert!(bundle.savings.is_none());
        assert_eq!(bundle.specific.len(), NORMAL_TIPS.len() + 1);
    }

    #[test]
    fn test_rejects_bad_price() {
        let g = generator();
        assert!(matches!(g.recommend(300.0, 1, 0.0), Err(AdvisorError::InvalidInput(_))));
        assert!(matches!(g.recommend(300.0, 1, -1.0), Err(AdvisorError::InvalidInput(_))));
    }

    #[test]
    fn test_propagates_classifier_errors() {
        assert!(matches!(
            generator().recommend(300.0, 0, 1000.0),
            Err(AdvisorError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_advise_uses_default_price() {
        let bundle = generator().advise(400.0, 1).unwrap();
        assert_eq!(bundle.savings.unwrap().price_per_kwh, 1000.0);
    }

    #[test]
    fn test_advise_rejects_non_positive_values() {
        let g = generator();
        assert!(matches!(g.advise(0.0, 2), Err(AdvisorError::InvalidInput(_))));
        assert!(matches!(g.advise(-10.0, 2), Err(AdvisorError::InvalidInput(_))));
        assert!(matches!(g.advise(100.0, 0), Err(AdvisorError::InvalidInput(_))));
    }
}
