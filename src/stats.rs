//! Descriptive statistics for numeric columns.

use serde::{Deserialize, Serialize};

/// `count, mean, std, min, 25%, 50%, 75%, max` for one numeric column.
///
/// Every metric except `count` is absent when the column has no values;
/// `std` is the sample deviation and needs at least two values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NumericSummary {
    pub column: String,
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub p25: Option<f64>,
    #[serde(rename = "50%")]
    pub p50: Option<f64>,
    #[serde(rename = "75%")]
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

impl NumericSummary {
    pub fn from_values(column: &str, values: &[Option<f64>]) -> Self {
        let mut stats = ColumnStats::default();
        for value in values.iter().flatten() {
            stats.add_value(*value);
        }
        stats.finish(column)
    }
}

#[derive(Debug, Default)]
struct ColumnStats {
    values: Vec<f64>,
    sum: f64,
    min: Option<f64>,
    max: Option<f64>,
}

impl ColumnStats {
    fn add_value(&mut self, value: f64) {
        self.sum += value;
        self.min = Some(match self.min {
            Some(current) => current.min(value),
            None => value,
        });
        self.max = Some(match self.max {
            Some(current) => current.max(value),
            None => value,
        });
        self.values.push(value);
    }

    fn count(&self) -> usize {
        self.values.len()
    }

    fn mean(&self) -> Option<f64> {
        if self.count() > 0 {
            Some(self.sum / self.count() as f64)
        } else {
            None
        }
    }

    fn std_dev(&self) -> Option<f64> {
        if self.count() < 2 {
            return None;
        }
        let mean = self.mean()?;
        let squared = self
            .values
            .iter()
            .map(|v| (v - mean) * (v - mean))
            .sum::<f64>();
        Some((squared / (self.count() as f64 - 1.0)).max(0.0).sqrt())
    }

    fn finish(mut self, column: &str) -> NumericSummary {
        let mean = self.mean();
        let std = self.std_dev();
        self.values.sort_by(f64::total_cmp);
        NumericSummary {
            column: column.to_string(),
            count: self.count(),
            mean,
            std,
            min: self.min,
            p25: quantile(&self.values, 0.25),
            p50: quantile(&self.values, 0.5),
            p75: quantile(&self.values, 0.75),
            max: self.max,
        }
    }
}

/// Linear interpolation between the closest ranks of a sorted slice.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}
