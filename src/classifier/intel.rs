//! Strict classification: domains must end in `label.tld`, only that suffix is
//! scored, and whitelisted suffixes are cleared without touching the model.

use anyhow::Result;
use tracing::debug;

use super::{into_prob_output, Classifier};
use crate::domain::{registrable_suffix, Whitelist};
use crate::input::DomainInput;
use crate::predict::{Prediction, ProbOutput};
use crate::report::{self, OutputTarget};

pub struct Intel {
    classifier: Classifier,
    whitelist: Whitelist,
}

impl Intel {
    pub fn new(classifier: Classifier, whitelist: Whitelist) -> Self {
        Self { classifier, whitelist }
    }

    /// Predictions keep the domain as given; the score comes from its suffix.
    pub fn get_pairs(&self, input: impl Into<DomainInput>) -> Result<Vec<Prediction>> {
        let domains = input.into().normalize()?;

        let mut suffixes = Vec::with_capacity(domains.len());
        for domain in &domains {
            suffixes.push(registrable_suffix(domain)?);
        }

        let (cleared, to_score): (Vec<usize>, Vec<usize>) =
            (0..domains.len()).partition(|&i| self.whitelist.clears(suffixes[i]));
        debug!(cleared = cleared.len(), scored = to_score.len(), "whitelist applied");

        let batch: Vec<&str> = to_score.iter().map(|&i| suffixes[i]).collect();
        let scores = self.classifier.score_domains(&batch)?;

        let mut probs = vec![0.0f32; domains.len()];
        for (&i, p) in to_score.iter().zip(scores) {
            probs[i] = p;
        }

        Ok(domains
            .into_iter()
            .zip(probs)
            .map(|(domain, p)| Prediction::new(domain, p))
            .collect())
    }

    pub fn get_prob(&self, input: impl Into<DomainInput>) -> Result<ProbOutput> {
        Ok(into_prob_output(self.get_pairs(input)?))
    }

    pub fn get_raw(&self, input: impl Into<DomainInput>) -> Result<Vec<f32>> {
        Ok(self.get_pairs(input)?.into_iter().map(|p| p.probability).collect())
    }

    pub fn get_prediction(
        &self,
        input: impl Into<DomainInput>,
        target: &OutputTarget,
    ) -> Result<Option<Vec<String>>> {
        target.validate()?;
        let pairs = self.get_pairs(input)?;
        report::emit(&pairs, target)
    }
}
