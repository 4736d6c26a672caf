//! Chart series types and the aggregations that fill them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One bar of a horizontal bar chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarChart {
    pub title: String,
    pub bars: Vec<Bar>,
}

impl BarChart {
    pub fn new(title: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            title: title.into(),
            bars,
        }
    }

    /// Bar chart of counts, keeping the order given.
    pub fn from_counts(title: impl Into<String>, counts: Vec<(String, usize)>) -> Self {
        Self::new(
            title,
            counts
                .into_iter()
                .map(|(label, n)| Bar {
                    label,
                    value: n as f64,
                })
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub label: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

/// Half-open bin `[start, end)`; the last bin of a histogram also holds `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub title: String,
    pub bins: Vec<HistogramBin>,
    /// Mean of the plotted values; `None` when there are none
    pub mean: Option<f64>,
}

/// Single-number indicator, e.g. a percentage gauge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub title: String,
    pub value: f64,
    pub suffix: String,
}

/// Count occurrences, most frequent first. Ties keep first-appearance order.
pub fn count_by<'a, I>(values: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut positions: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for v in values {
        match positions.get(v) {
            Some(&i) => counts[i].1 += 1,
            None => {
                positions.insert(v, counts.len());
                counts.push((v.to_string(), 1));
            }
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[i64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64)
    }
}

/// Equal-width histogram over `[min, max]`.
///
/// With a single distinct value everything lands in one bin of width 1.
pub fn histogram(title: impl Into<String>, values: &[i64], bin_count: usize) -> Histogram {
    let title = title.into();
    let (Some(&min), Some(&max)) = (values.iter().min(), values.iter().max()) else {
        return Histogram {
            title,
            bins: Vec::new(),
            mean: None,
        };
    };

    let (lo, hi) = (min as f64, max as f64);
    if min == max || bin_count <= 1 {
        let end = if min == max { lo + 1.0 } else { hi };
        return Histogram {
            title,
            bins: vec![HistogramBin {
                start: lo,
                end,
                count: values.len(),
            }],
            mean: mean(values),
        };
    }

    let width = (hi - lo) / bin_count as f64;
    let mut bins: Vec<HistogramBin> = (0..bin_count)
        .map(|i| HistogramBin {
            start: lo + width * i as f64,
            end: lo + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for &v in values {
        let idx = (((v as f64) - lo) / width).floor() as usize;
        bins[idx.min(bin_count - 1)].count += 1;
    }

    Histogram {
        title,
        bins,
        mean: mean(values),
    }
}
