use serde::Serialize;
use std::time::Instant;

/// Milliseconds elapsed since `since`.
#[inline]
pub fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}

/// Wall time of one named stage.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

/// Stage timings of one tracker call, in execution order.
///
/// `total_ms` covers the whole call and is usually larger than the sum of
/// the stages.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn push(&mut self, label: impl Into<String>, elapsed_ms: f64) {
        self.stages.push(StageTiming {
            label: label.into(),
            elapsed_ms,
        });
    }

    /// Record a stage that started at `since` and ends now.
    pub fn lap(&mut self, label: impl Into<String>, since: Instant) {
        self.push(label, elapsed_ms(since));
    }

    /// Close the breakdown of a call that started at `since`.
    pub fn finish(&mut self, since: Instant) {
        self.total_ms = elapsed_ms(since);
    }

    pub fn stage(&self, label: &str) -> Option<&StageTiming> {
        self.stages.iter().find(|s| s.label == label)
    }
}
