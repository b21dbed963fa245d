use std::fmt;

/// Hit/total counter of one classification pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub hits: u64,
    pub total: u64,
}

impl Tally {
    pub fn hit(&mut self) {
        self.hits += 1;
        self.total += 1;
    }

    pub fn miss(&mut self) {
        self.total += 1;
    }

    /// `100 * hits / total`, `None` when nothing was counted.
    pub fn percentage(&self) -> Option<f32> {
        if self.total == 0 {
            return None;
        }
        Some((self.hits * 100) as f32 / self.total as f32)
    }
}

/// Harmonic mean of recall and precision.
pub fn f_measure(recall: Option<f32>, precision: Option<f32>) -> Option<f32> {
    let (r, p) = (recall?, precision?);
    if r + p == 0.0 {
        return None;
    }
    Some(2.0 * r * p / (r + p))
}

/// Outcome of a full comparison, all values in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Scores {
    pub recall: Option<f32>,
    pub precision: Option<f32>,
    pub f_measure: Option<f32>,
}

/// Formats a metric, spelling out the undefined case.
pub fn display_metric(value: Option<f32>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "undefined".to_string(),
    }
}

impl fmt::Display for Scores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Recall : {}", display_metric(self.recall))?;
        writeln!(f, "Precision : {}", display_metric(self.precision))?;
        write!(f, "F-measure : {}", display_metric(self.f_measure))
    }
}
