use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Most frequent values kept per categorical column.
pub const TOP_K: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Top values of one categorical column, by non-increasing count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoricalSummary {
    pub column: String,
    pub top: Vec<ValueCount>,
}

impl CategoricalSummary {
    pub fn most_common(&self) -> Option<&ValueCount> {
        self.top.first()
    }
}

/// Counts values in first-seen order so equal counts keep that order after
/// the stable sort.
#[derive(Debug, Default)]
pub struct FrequencyAccumulator {
    index: HashMap<String, usize>,
    counts: Vec<(String, usize)>,
}

impl FrequencyAccumulator {
    pub fn record(&mut self, value: &str) {
        if let Some(&slot) = self.index.get(value) {
            self.counts[slot].1 += 1;
            return;
        }
        self.index.insert(value.to_string(), self.counts.len());
        self.counts.push((value.to_string(), 1));
    }

    pub fn top(mut self, column: &str, top: usize) -> CategoricalSummary {
        self.counts.sort_by(|a, b| b.1.cmp(&a.1));
        self.counts.truncate(top);
        CategoricalSummary {
            column: column.to_string(),
            top: self
                .counts
                .into_iter()
                .map(|(value, count)| ValueCount { value, count })
                .collect(),
        }
    }
}

pub fn top_values<'a, I>(column: &str, values: I, top: usize) -> CategoricalSummary
where
    I: IntoIterator<Item = &'a str>,
{
    let mut accumulator = FrequencyAccumulator::default();
    for value in values {
        accumulator.record(value);
    }
    accumulator.top(column, top)
}
