//! Output formatting for predictions.

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::error::DgaError;
use crate::input::is_txt;
use crate::predict::Prediction;

/// Where `get_prediction` sends its sentences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Print to stdout.
    Show,
    /// Hand the sentences back to the caller.
    Collect,
    /// Overwrite a `.txt` file.
    File(PathBuf),
}

impl OutputTarget {
    pub fn validate(&self) -> Result<(), DgaError> {
        match self {
            OutputTarget::File(path) if !is_txt(path) => {
                Err(DgaError::InvalidOutputPath(path.display().to_string()))
            }
            _ => Ok(()),
        }
    }
}

/// Prints, collects or writes the predictions. Only `Collect` returns sentences.
pub fn emit(predictions: &[Prediction], target: &OutputTarget) -> Result<Option<Vec<String>>> {
    target.validate()?;

    let sentences: Vec<String> = predictions.iter().map(Prediction::sentence).collect();

    match target {
        OutputTarget::Show => {
            for p in predictions {
                println!("{p}");
            }
            Ok(None)
        }
        OutputTarget::Collect => Ok(Some(sentences)),
        OutputTarget::File(path) => {
            fs::write(path, sentences.concat())
                .with_context(|| format!("Failed to write predictions to {}", path.display()))?;
            info!(path = %path.display(), count = predictions.len(), "predictions written");
            Ok(None)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {s}. Use 'text' or 'json'.")),
        }
    }
}

pub fn render(predictions: &[Prediction], format: OutputFormat, threshold: f32) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(predictions.iter().map(Prediction::sentence).collect()),
        OutputFormat::Json => render_json(predictions, threshold),
    }
}

fn render_json(predictions: &[Prediction], threshold: f32) -> Result<String> {
    let dga = predictions.iter().filter(|p| p.is_dga_at(threshold)).count();
    let output = serde_json::json!({
        "results": predictions,
        "summary": {
            "total": predictions.len(),
            "dga": dga,
            "genuine": predictions.len() - dga,
            "threshold": threshold,
        }
    });
    let mut s = serde_json::to_string_pretty(&output)?;
    s.push('\n');
    Ok(s)
}
