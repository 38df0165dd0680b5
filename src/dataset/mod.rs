//! Historical consumption dataset
//!
//! Loaded once at startup and shared read-only (`Arc<HistoricalDataset>`)
//! by every classification.

use crate::error::AdvisorError;
use crate::models::{ConsumptionRecord, ConsumptionStatistics};
use crate::Result;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

const PEOPLE_COLUMN: &str = "Personas";
const CONSUMPTION_COLUMN: &str = "Consumo";

/// Row layout of the source CSV (`Año, Mes, Personas, Consumo`).
/// Unlisted columns are ignored.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Personas")]
    people: i64,
    #[serde(rename = "Consumo")]
    consumption: f64,
}

/// Immutable collection of historical records
#[derive(Debug, Clone, Default)]
pub struct HistoricalDataset {
    records: Vec<ConsumptionRecord>,
}

impl HistoricalDataset {
    pub fn from_records(records: Vec<ConsumptionRecord>) -> Self {
        Self { records }
    }

    /// Load records from a CSV file with Spanish headers.
    ///
    /// Rows with blank or malformed cells are skipped and logged.
    pub fn from_csv_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            AdvisorError::DatasetError(format!("cannot open {}: {}", path.display(), e))
        })?;

        let dataset = Self::from_csv_reader(file)?;

        info!(
            path = %path.display(),
            records = dataset.len(),
            valid = dataset.valid_count(),
            "Historical dataset loaded"
        );

        Ok(dataset)
    }

    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        for required in [PEOPLE_COLUMN, CONSUMPTION_COLUMN] {
            if !headers.iter().any(|h| h == required) {
                return Err(AdvisorError::DatasetError(format!(
                    "missing required column '{}'",
                    required
                )));
            }
        }

        let mut records = Vec::new();
        let mut skipped = 0usize;

        for (index, row) in csv_reader.deserialize::<CsvRow>().enumerate() {
            match row {
                Ok(row) if row.consumption.is_finite() && row.consumption >= 0.0 => {
                    records.push(ConsumptionRecord::new(row.people, row.consumption));
                }
                Ok(row) => {
                    warn!(
                        line = index + 2,
                        consumption = row.consumption,
                        "Skipping dataset row with negative or non-finite consumption"
                    );
                    skipped += 1;
                }
                Err(e) => {
                    // header is line 1
                    warn!(line = index + 2, error = %e, "Skipping malformed dataset row");
                    skipped += 1;
                }
            }
        }

        if skipped > 0 {
            warn!(skipped, kept = records.len(), "Dataset rows skipped during load");
        }

        Ok(Self { records })
    }

    pub fn records(&self) -> &[ConsumptionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records that take part in statistics (`people > 0`)
    pub fn valid_records(&self) -> impl Iterator<Item = &ConsumptionRecord> {
        self.records.iter().filter(|r| r.is_valid())
    }

    pub fn valid_count(&self) -> usize {
        self.valid_records().count()
    }

    /// Mean and sample standard deviation of per-person consumption.
    pub fn statistics(&self) -> Result<ConsumptionStatistics> {
        let values: Vec<f64> = self.valid_records().map(|r| r.per_person()).collect();

        if values.len() < 2 {
            return Err(AdvisorError::InsufficientData(values.len()));
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);

        Ok(ConsumptionStatistics {
            mean,
            stddev: variance.sqrt(),
        })
    }
}

/// Per-person values 100, 200, 300: mean 200, sample stddev 100.
#[cfg(test)]
pub(crate) fn sample_dataset() -> std::sync::Arc<HistoricalDataset> {
    std::sync::Arc::new(HistoricalDataset::from_records(vec![
        ConsumptionRecord::new(1, 100.0),
        ConsumptionRecord::new(2, 400.0),
        ConsumptionRecord::new(3, 900.0),
        // excluded from statistics
        ConsumptionRecord::new(0, 5000.0),
    ]))
}
