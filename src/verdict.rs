use std::fmt;

/// Outcome shown to the user for one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    TumourFound,
    TumourNotFound,
}

impl Verdict {
    /// Any class probability strictly above `threshold` counts as a finding.
    pub fn from_probabilities(probabilities: &[f32], threshold: f32) -> Self {
        if probabilities.len() != 2 {
            tracing::warn!(
                classes = probabilities.len(),
                "classifier returned an unexpected number of classes"
            );
        }

        if probabilities.iter().any(|&prob| prob > threshold) {
            Verdict::TumourFound
        } else {
            Verdict::TumourNotFound
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Verdict::TumourFound => "Tumour Found",
            Verdict::TumourNotFound => "Tumour not found",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
