//! dgaintel CLI - classifies domain names with the ONNX DGA model.
//!
//! Usage:
//!   dgaintel microsoft.com hsfkjdshfjasdhfk.com --model domain_classifier_model.onnx
//!   dgaintel domains.txt --output predictions.txt
//!   dgaintel mail.google.com --whitelist google.com --format json
//!   tail -f dns.log | dgaintel --stdin --batch-size 128

use std::io::{self, BufRead};
use std::path::PathBuf;
use std::thread;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::warn;

use dgaintel_lib::classifier::{spawn_classifier, Classify};
use dgaintel_lib::input::normalize_domain;
use dgaintel_lib::report::{self, OutputFormat, OutputTarget};
use dgaintel_lib::{logging, Classifier, Config, DomainInput, Intel, Prediction, Whitelist};

#[derive(Parser)]
#[command(name = "dgaintel")]
#[command(about = "Classify domain names as DGA or genuine")]
struct Cli {
    /// Domains to classify, or .txt files with one domain per line
    #[arg(required_unless_present = "stdin")]
    targets: Vec<String>,

    /// Path to the ONNX model file
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Domain (label.tld) or TLD that is always genuine; enables validation
    #[arg(short, long)]
    whitelist: Vec<String>,

    /// Require every domain to end in label.tld and score only that suffix
    #[arg(long)]
    validate: bool,

    /// Write prediction sentences to this .txt file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Print bare probabilities, one per line
    #[arg(long)]
    raw: bool,

    /// Read domains from stdin, one per line, and classify them in batches
    #[arg(long)]
    stdin: bool,

    /// Domains per forward pass in --stdin mode
    #[arg(long)]
    batch_size: Option<usize>,

    /// DGA threshold (0.0-1.0) for the summary and --fail-on-dga
    #[arg(short, long)]
    threshold: Option<f32>,

    /// Exit with status 2 if any domain scores at or above the threshold
    #[arg(long)]
    fail_on_dga: bool,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn resolve_config(&self) -> Result<Config> {
        self.resolve_config_from(Config::from_env())
    }

    /// Applies the config file, then the command-line flags, over `base`.
    fn resolve_config_from(&self, base: Config) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => base.load_over(path)?,
            None => base,
        };
        if let Some(model) = &self.model {
            config.model_path = model.clone();
        }
        if let Some(t) = self.threshold {
            config.threshold = t;
        }
        if let Some(n) = self.batch_size {
            config.batch_size = n;
        }
        config.whitelist.extend(self.whitelist.iter().cloned());
        config.validate()?;
        Ok(config)
    }

    fn strict(&self, config: &Config) -> bool {
        self.validate || !config.whitelist.is_empty()
    }
}

fn load_engine(config: &Config, strict: bool) -> Result<Box<dyn Classify>> {
    let classifier = Classifier::from_model_file(&config.model_path, config.intra_threads)?;
    if strict {
        let whitelist = Whitelist::new(&config.whitelist);
        Ok(Box::new(Intel::new(classifier, whitelist)))
    } else {
        Ok(Box::new(classifier))
    }
}

fn collect_targets(targets: &[String]) -> Result<Vec<String>> {
    let mut domains = Vec::new();
    for target in targets {
        domains.extend(DomainInput::from_arg(target).normalize()?);
    }
    Ok(domains)
}

fn print_predictions(cli: &Cli, predictions: &[Prediction], threshold: f32) -> Result<()> {
    if let Some(path) = &cli.output {
        report::emit(predictions, &OutputTarget::File(path.clone()))?;
        eprintln!("[*] Wrote {} predictions to {}", predictions.len(), path.display());
    } else if cli.raw {
        for p in predictions {
            println!("{}", p.probability);
        }
    } else {
        print!("{}", report::render(predictions, cli.format, threshold)?);
    }
    Ok(())
}

fn run_batch(cli: &Cli, config: &Config) -> Result<Vec<Prediction>> {
    let domains = collect_targets(&cli.targets)?;
    if domains.is_empty() {
        eprintln!("[*] No domains to classify.");
        return Ok(Vec::new());
    }

    eprintln!("[*] Loading model from {}...", config.model_path.display());
    let engine = load_engine(config, cli.strict(config))?;

    let predictions = engine.classify(&domains)?;
    print_predictions(cli, &predictions, config.threshold)?;
    Ok(predictions)
}

fn run_stream(cli: &Cli, config: &Config) -> Result<Vec<Prediction>> {
    eprintln!("[*] Loading model from {}...", config.model_path.display());
    let engine_config = config.clone();
    let strict = cli.strict(config);
    let handles = spawn_classifier(move || load_engine(&engine_config, strict))?;

    let batch_size = config.batch_size;
    let tx = handles.tx;
    let reader = thread::spawn(move || {
        let stdin = io::stdin();
        let mut batch = Vec::with_capacity(batch_size);
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    warn!("Stopped reading stdin: {e}");
                    break;
                }
            };
            let domain = normalize_domain(&line);
            if domain.is_empty() {
                continue;
            }
            batch.push(domain);
            if batch.len() >= batch_size && tx.send(std::mem::take(&mut batch)).is_err() {
                return;
            }
        }
        if !batch.is_empty() {
            let _ = tx.send(batch);
        }
    });

    // With --output everything is written once the stream ends.
    let collect_only = cli.output.is_some();
    let mut all = Vec::new();
    let mut failed = 0usize;
    let mut batches = 0usize;
    let mut micros = 0u128;

    for batch in handles.rx.iter() {
        batches += 1;
        micros += batch.micros;
        match batch.result {
            Ok(predictions) => {
                if !collect_only {
                    match cli.format {
                        OutputFormat::Json if !cli.raw => {
                            for p in &predictions {
                                println!("{}", serde_json::to_string(p)?);
                            }
                        }
                        _ => print_predictions(cli, &predictions, config.threshold)?,
                    }
                }
                all.extend(predictions);
            }
            Err(e) => {
                failed += 1;
                eprintln!("[!] Batch of {} domains failed: {e:#}", batch.domains.len());
            }
        }
    }

    let _ = reader.join();
    let _ = handles.worker.join();

    eprintln!(
        "[*] {} batches, {:.1} ms inference",
        batches,
        micros as f64 / 1000.0
    );

    if let Some(path) = &cli.output {
        report::emit(&all, &OutputTarget::File(path.clone()))?;
        eprintln!("[*] Wrote {} predictions to {}", all.len(), path.display());
    }
    if failed > 0 {
        bail!("{failed} batch(es) could not be classified");
    }
    Ok(all)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(if cli.verbose { "debug" } else { "warn" });

    let config = cli.resolve_config()?;
    if let Some(path) = &cli.output {
        OutputTarget::File(path.clone()).validate()?;
    }

    let predictions = if cli.stdin {
        run_stream(&cli, &config)?
    } else {
        run_batch(&cli, &config)?
    };

    let dga = predictions.iter().filter(|p| p.is_dga_at(config.threshold)).count();
    eprintln!("[*] Classified {} domains, {} flagged as DGA", predictions.len(), dga);

    if cli.fail_on_dga && dga > 0 {
        std::process::exit(2);
    }
    Ok(())
}
