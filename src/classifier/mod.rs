pub mod intel;
pub mod model;
pub mod service;

use anyhow::Result;
use std::path::Path;
use tracing::debug;

use crate::input::DomainInput;
use crate::predict::{Prediction, ProbOutput};
use crate::report::{self, OutputTarget};
use crate::vectorize::vectorize;

pub use intel::Intel;
pub use model::{DgaModel, Scorer};
pub use service::{spawn_classifier, ClassifiedBatch, ClassifierHandles};

/// Plain classification: every domain is encoded as given.
pub struct Classifier {
    scorer: Box<dyn Scorer>,
}

impl Classifier {
    pub fn new<S: Scorer + 'static>(scorer: S) -> Self {
        Self { scorer: Box::new(scorer) }
    }

    pub fn from_model_file<P: AsRef<Path>>(path: P, intra_threads: usize) -> Result<Self> {
        Ok(Self::new(DgaModel::load(path, intra_threads)?))
    }

    /// Encodes and scores already-normalized domains in one forward pass.
    pub fn score_domains<S: AsRef<str>>(&self, domains: &[S]) -> Result<Vec<f32>> {
        if domains.is_empty() {
            return Ok(Vec::new());
        }
        let batch = vectorize(domains)?;
        debug!(rows = batch.nrows(), "scoring batch");
        let probs = self.scorer.score(&batch)?;
        model::check_scores(probs, batch.nrows())
    }

    pub fn get_pairs(&self, input: impl Into<DomainInput>) -> Result<Vec<Prediction>> {
        let domains = input.into().normalize()?;
        let probs = self.score_domains(&domains)?;
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
        let domains = input.into().normalize()?;
        self.score_domains(&domains)
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

/// Batch entry point shared by [`Classifier`] and [`Intel`], used by the
/// classifier thread.
pub trait Classify {
    fn classify(&self, domains: &[String]) -> Result<Vec<Prediction>>;
}

impl Classify for Classifier {
    fn classify(&self, domains: &[String]) -> Result<Vec<Prediction>> {
        self.get_pairs(domains.to_vec())
    }
}

impl Classify for Intel {
    fn classify(&self, domains: &[String]) -> Result<Vec<Prediction>> {
        self.get_pairs(domains.to_vec())
    }
}

impl<C: Classify + ?Sized> Classify for Box<C> {
    fn classify(&self, domains: &[String]) -> Result<Vec<Prediction>> {
        (**self).classify(domains)
    }
}

pub(crate) fn into_prob_output(mut pairs: Vec<Prediction>) -> ProbOutput {
    if pairs.len() == 1 {
        if let Some(only) = pairs.pop() {
            return ProbOutput::Scalar(only.probability);
        }
    }
    ProbOutput::Pairs(pairs)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::Scorer;
    use anyhow::Result;
    use ndarray::Array2;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Scores a row by the share of its characters that are not vowels,
    /// which is enough to separate random strings from words in tests.
    pub struct ConsonantScorer {
        pub calls: Rc<Cell<usize>>,
        pub rows_seen: Rc<Cell<usize>>,
    }

    impl ConsonantScorer {
        pub fn new() -> Self {
            Self {
                calls: Rc::new(Cell::new(0)),
                rows_seen: Rc::new(Cell::new(0)),
            }
        }
    }

    impl Scorer for ConsonantScorer {
        fn score(&self, batch: &Array2<f32>) -> Result<Vec<f32>> {
            self.calls.set(self.calls.get() + 1);
            self.rows_seen.set(self.rows_seen.get() + batch.nrows());
            // a, e, i, o, u, y
            const VOWELS: [f32; 6] = [13.0, 17.0, 21.0, 27.0, 33.0, 37.0];
            Ok(batch
                .rows()
                .into_iter()
                .map(|row| {
                    let letters: Vec<f32> = row.iter().copied().filter(|v| *v >= 13.0).collect();
                    if letters.is_empty() {
                        return 0.0;
                    }
                    let consonants = letters.iter().filter(|v| !VOWELS.contains(v)).count();
                    consonants as f32 / letters.len() as f32
                })
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::ConsonantScorer;
    use super::*;
    use crate::error::DgaError;

    #[test]
    fn single_domain_gives_scalar() {
        let clf = Classifier::new(ConsonantScorer::new());
        let out = clf.get_prob("bcdfg.com").unwrap();
        // b c d f g c m are consonants, o is a vowel: 7 of 8 letters.
        assert_eq!(out, ProbOutput::Scalar(7.0 / 8.0));
    }

    #[test]
    fn several_domains_give_pairs_in_input_order() {
        let clf = Classifier::new(ConsonantScorer::new());
        let out = clf.get_prob(&["Microsoft.com", "xkcdqzj.net"][..]).unwrap();
        match out {
            ProbOutput::Pairs(pairs) => {
                assert_eq!(pairs.len(), 2);
                assert_eq!(pairs[0].domain, "microsoft.com");
                assert_eq!(pairs[1].domain, "xkcdqzj.net");
                assert!(pairs[1].probability > pairs[0].probability);
            }
            other => panic!("expected pairs, got {other:?}"),
        }
    }

    #[test]
    fn raw_scores_match_batch() {
        let clf = Classifier::new(ConsonantScorer::new());
        let raw = clf.get_raw(vec!["aaa.io".to_string(), "zzz.io".to_string()]).unwrap();
        assert_eq!(raw.len(), 2);
        assert!(raw[0] < raw[1]);
    }

    #[test]
    fn empty_input_skips_the_model() {
        let scorer = ConsonantScorer::new();
        let calls = scorer.calls.clone();
        let clf = Classifier::new(scorer);
        assert_eq!(clf.get_prob(Vec::<String>::new()).unwrap(), ProbOutput::Pairs(vec![]));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn unknown_character_is_a_typed_error() {
        let clf = Classifier::new(ConsonantScorer::new());
        let err = clf.get_prob(&["fine.com", "not fine.com"][..]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DgaError>(),
            Some(DgaError::UnknownCharacter { character: ' ', .. })
        ));
    }

    #[test]
    fn bad_output_path_fails_before_inference() {
        let scorer = ConsonantScorer::new();
        let calls = scorer.calls.clone();
        let clf = Classifier::new(scorer);
        let target = OutputTarget::File("preds.json".into());
        assert!(clf.get_prediction("a.com", &target).is_err());
        assert_eq!(calls.get(), 0);
    }
}
