use anyhow::{anyhow, Context, Result};
use ndarray::Array2;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, info};

use crate::error::DgaError;

/// Anything that maps a `(batch, 82)` encoded batch to one probability per row.
pub trait Scorer {
    fn score(&self, batch: &Array2<f32>) -> Result<Vec<f32>>;
}

impl<S: Scorer + ?Sized> Scorer for Box<S> {
    fn score(&self, batch: &Array2<f32>) -> Result<Vec<f32>> {
        (**self).score(batch)
    }
}

impl<S: Scorer + ?Sized> Scorer for Arc<S> {
    fn score(&self, batch: &Array2<f32>) -> Result<Vec<f32>> {
        (**self).score(batch)
    }
}

/// The pretrained character-level DGA network, exported to ONNX.
pub struct DgaModel {
    session: Mutex<Session>,
}

impl DgaModel {
    pub fn load<P: AsRef<Path>>(model_path: P, intra_threads: usize) -> Result<Self> {
        let model_path = model_path.as_ref();
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(intra_threads)?
            .commit_from_file(model_path)
            .with_context(|| format!("Failed to load DGA model from {}", model_path.display()))?;

        info!(path = %model_path.display(), "DGA model loaded");

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl Scorer for DgaModel {
    fn score(&self, batch: &Array2<f32>) -> Result<Vec<f32>> {
        let rows = batch.nrows();
        if rows == 0 {
            return Ok(Vec::new());
        }

        let input_tensor = TensorRef::from_array_view(batch)
            .context("Failed to create input tensor")?;

        let t0 = Instant::now();

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("Failed to lock model session: {e}"))?;
        let outputs = session
            .run(ort::inputs![input_tensor])
            .context("Failed to run DGA model")?;

        // Single output of shape (batch, 1).
        let output_array = outputs[0].try_extract_array::<f32>()?;
        let probs: Vec<f32> = output_array.iter().copied().collect();

        debug!(rows, micros = t0.elapsed().as_micros() as u64, "batch scored");

        Ok(probs)
    }
}

/// Scorer output must hold one finite value per row; values are bounded to [0, 1].
pub(crate) fn check_scores(probs: Vec<f32>, rows: usize) -> Result<Vec<f32>> {
    if probs.len() != rows {
        return Err(DgaError::ScoreCount { expected: rows, got: probs.len() }.into());
    }
    probs
        .into_iter()
        .enumerate()
        .map(|(row, score)| {
            if score.is_finite() {
                Ok(score.clamp(0.0, 1.0))
            } else {
                Err(DgaError::NonFiniteScore { row, score }.into())
            }
        })
        .collect()
}
