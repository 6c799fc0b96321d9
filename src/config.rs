use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::predict::DGA_THRESHOLD;

pub const DEFAULT_MODEL_PATH: &str = "models/domain_classifier_model.onnx";
pub const MODEL_ENV_VAR: &str = "DGAINTEL_MODEL";

/// Resolved settings. Layers apply in order default, environment, config file, CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub model_path: PathBuf,
    pub intra_threads: usize,
    pub threshold: f32,
    pub whitelist: Vec<String>,
    pub batch_size: usize,
}

/// On-disk JSON form. Absent keys leave the layer below untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    model_path: Option<PathBuf>,
    intra_threads: Option<usize>,
    threshold: Option<f32>,
    whitelist: Vec<String>,
    batch_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            intra_threads: 1,
            threshold: DGA_THRESHOLD,
            whitelist: Vec::new(),
            batch_size: 64,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Config::default().load_over(path)
    }

    /// Reads a config file and applies the keys it sets on top of `self`.
    pub fn load_over<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let file: ConfigFile = serde_json::from_str(&s)
            .with_context(|| format!("parse config {}", path.display()))?;

        if let Some(model_path) = file.model_path {
            self.model_path = model_path;
        }
        if let Some(intra_threads) = file.intra_threads {
            self.intra_threads = intra_threads;
        }
        if let Some(threshold) = file.threshold {
            self.threshold = threshold;
        }
        if let Some(batch_size) = file.batch_size {
            self.batch_size = batch_size;
        }
        self.whitelist.extend(file.whitelist);

        self.validate()?;
        Ok(self)
    }

    /// Defaults, with the model path taken from `DGAINTEL_MODEL` when set.
    pub fn from_env() -> Self {
        Config::default().with_model_env(std::env::var_os(MODEL_ENV_VAR))
    }

    pub fn with_model_env(mut self, value: Option<OsString>) -> Self {
        if let Some(path) = value.filter(|v| !v.is_empty()) {
            self.model_path = PathBuf::from(path);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            bail!("threshold {} not in [0, 1]", self.threshold);
        }
        if self.batch_size == 0 {
            bail!("batch_size must be greater than zero");
        }
        if self.intra_threads == 0 {
            bail!("intra_threads must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(body.as_bytes()).unwrap();
        f
    }

    #[test]
    fn missing_fields_take_defaults() {
        let f = write_config(r#"{ "whitelist": ["google.com"] }"#);
        let config = Config::load(f.path()).unwrap();
        assert_eq!(config.whitelist, vec!["google.com"]);
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(config.threshold, 0.5);
        assert_eq!(config.batch_size, 64);
    }

    #[test]
    fn full_config_parses() {
        let f = write_config(
            r#"{
                "model_path": "/opt/dga/model.onnx",
                "intra_threads": 4,
                "threshold": 0.8,
                "whitelist": [],
                "batch_size": 256
            }"#,
        );
        let config = Config::load(f.path()).unwrap();
        assert_eq!(config.model_path, PathBuf::from("/opt/dga/model.onnx"));
        assert_eq!(config.intra_threads, 4);
        assert_eq!(config.batch_size, 256);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let f = write_config(r#"{ "threshold": 1.5 }"#);
        assert!(Config::load(f.path()).is_err());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let f = write_config(r#"{ "batch_size": 0 }"#);
        assert!(Config::load(f.path()).is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let f = write_config(r#"{ "modle_path": "typo.onnx" }"#);
        let err = Config::load(f.path()).unwrap_err();
        assert!(format!("{err:#}").contains("modle_path"));
    }

    #[test]
    fn zero_intra_threads_is_rejected() {
        let f = write_config(r#"{ "intra_threads": 0 }"#);
        assert!(Config::load(f.path()).is_err());
    }

    #[test]
    fn env_model_path_replaces_default() {
        let config = Config::default().with_model_env(Some("/srv/dga.onnx".into()));
        assert_eq!(config.model_path, PathBuf::from("/srv/dga.onnx"));

        let config = Config::default().with_model_env(Some(OsString::new()));
        assert_eq!(config.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
    }

    #[test]
    fn file_keys_layer_over_base() {
        let base = Config::default().with_model_env(Some("/srv/dga.onnx".into()));
        let f = write_config(r#"{ "threshold": 0.7, "whitelist": ["google.com"] }"#);
        let config = base.load_over(f.path()).unwrap();
        assert_eq!(config.model_path, PathBuf::from("/srv/dga.onnx"));
        assert_eq!(config.threshold, 0.7);
        assert_eq!(config.whitelist, vec!["google.com"]);

        let base = Config::default().with_model_env(Some("/srv/dga.onnx".into()));
        let f = write_config(r#"{ "model_path": "/opt/dga/model.onnx" }"#);
        let config = base.load_over(f.path()).unwrap();
        assert_eq!(config.model_path, PathBuf::from("/opt/dga/model.onnx"));
    }
}
