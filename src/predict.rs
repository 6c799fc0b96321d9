use serde::Serialize;
use std::fmt;

pub const DGA_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub domain: String,
    pub probability: f32,
}

impl Prediction {
    pub fn new(domain: impl Into<String>, probability: f32) -> Self {
        Self { domain: domain.into(), probability }
    }

    pub fn is_dga(&self) -> bool {
        self.is_dga_at(DGA_THRESHOLD)
    }

    pub fn is_dga_at(&self, threshold: f32) -> bool {
        self.probability >= threshold
    }

    /// Sentence form with the trailing newline, as written to result files.
    pub fn sentence(&self) -> String {
        format!("{self}\n")
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.is_dga() { "DGA" } else { "genuine" };
        write!(f, "{} is {} with probability {}", self.domain, verdict, self.probability)
    }
}

/// Single domain input yields a bare score, anything else yields pairs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbOutput {
    Scalar(f32),
    Pairs(Vec<Prediction>),
}

impl ProbOutput {
    pub fn scalar(&self) -> Option<f32> {
        match self {
            ProbOutput::Scalar(p) => Some(*p),
            ProbOutput::Pairs(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_inclusive() {
        assert!(Prediction::new("a.com", 0.5).is_dga());
        assert!(!Prediction::new("a.com", 0.4999).is_dga());
        assert!(Prediction::new("a.com", 0.7).is_dga_at(0.7));
    }

    #[test]
    fn sentences_read_like_the_cli_output() {
        assert_eq!(
            Prediction::new("microsoft.com", 0.25).to_string(),
            "microsoft.com is genuine with probability 0.25"
        );
        assert_eq!(
            Prediction::new("hsfkjdshfjasdhfk.com", 0.75).sentence(),
            "hsfkjdshfjasdhfk.com is DGA with probability 0.75\n"
        );
    }

    #[test]
    fn scalar_accessor() {
        assert_eq!(ProbOutput::Scalar(0.1).scalar(), Some(0.1));
        assert_eq!(ProbOutput::Pairs(vec![]).scalar(), None);
    }
}
