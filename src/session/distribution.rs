// src/session/distribution.rs — Emotion distribution shown in the pie chart.

use serde::{Deserialize, Serialize};

/// Server-side aggregate, replaced wholesale on every refresh.
///
/// `labels[i]` pairs with `data[i]`; if the server sends sequences of
/// different length the extra items are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmotionDistribution {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub data: Vec<f64>,
}

/// One pie slice, ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice<'a> {
    pub label: &'a str,
    pub value: f64,
    /// Share of the whole, 0.0..=1.0.
    pub fraction: f64,
}

impl EmotionDistribution {
    pub fn is_empty(&self) -> bool {
        self.slices().is_empty()
    }

    /// Paired, non-negative slices with their share of the total.
    /// Negative or non-finite values count as zero.
    pub fn slices(&self) -> Vec<Slice<'_>> {
        let values: Vec<(&str, f64)> = self
            .labels
            .iter()
            .zip(self.data.iter())
            .map(|(l, v)| {
                let v = if v.is_finite() && *v > 0.0 { *v } else { 0.0 };
                (l.as_str(), v)
            })
            .collect();

        let total: f64 = values.iter().map(|(_, v)| v).sum();
        if total <= 0.0 {
            return Vec::new();
        }

        values
            .into_iter()
            .map(|(label, value)| Slice {
                label,
                value,
                fraction: value / total,
            })
            .collect()
    }
}
