//! dgaintel: classify domain names as DGA or genuine with a pretrained
//! character-level network.
//!
//! Domains are lowercased, encoded as fixed-width vocabulary index vectors and
//! scored in one batched forward pass through an ONNX export of the model.

pub mod classifier;
pub mod config;
pub mod domain;
pub mod error;
pub mod input;
pub mod logging;
pub mod predict;
pub mod report;
pub mod vectorize;
pub mod vocab;

pub use classifier::{spawn_classifier, Classifier, Classify, DgaModel, Intel, Scorer};
pub use config::Config;
pub use domain::Whitelist;
pub use error::DgaError;
pub use input::DomainInput;
pub use predict::{Prediction, ProbOutput, DGA_THRESHOLD};
pub use report::{OutputFormat, OutputTarget};
pub use vectorize::MAX_DOMAIN_LEN;
