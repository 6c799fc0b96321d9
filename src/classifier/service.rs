use anyhow::{anyhow, Result};
use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, error, info};

use super::Classify;
use crate::predict::Prediction;

#[derive(Debug)]
pub struct ClassifiedBatch {
    pub domains: Vec<String>,
    pub result: Result<Vec<Prediction>>,
    pub micros: u128,
}

pub struct ClassifierHandles {
    pub tx: Sender<Vec<String>>,
    pub rx: Receiver<ClassifiedBatch>,
    pub worker: JoinHandle<()>,
}

/// Starts a classifier thread. The model is built by `loader` on that thread,
/// so it never has to cross threads; load failures are returned here.
///
/// Batches go in on `tx` (already normalized), results come back on `rx` in
/// submission order. Dropping `tx` stops the worker.
pub fn spawn_classifier<C, F>(loader: F) -> Result<ClassifierHandles>
where
    C: Classify,
    F: FnOnce() -> Result<C> + Send + 'static,
{
    let (tx_in, rx_in) = unbounded::<Vec<String>>();
    let (tx_out, rx_out) = unbounded::<ClassifiedBatch>();
    let (ready_tx, ready_rx) = bounded::<Result<(), String>>(1);

    let worker = thread::spawn(move || {
        let classifier = match loader() {
            Ok(c) => {
                let _ = ready_tx.send(Ok(()));
                c
            }
            Err(e) => {
                error!("Failed to load classifier: {:?}", e);
                let _ = ready_tx.send(Err(format!("{e:#}")));
                return;
            }
        };

        info!("Classifier thread ready, waiting for domains...");

        while let Ok(domains) = rx_in.recv() {
            let t0 = Instant::now();
            let result = classifier.classify(&domains);
            let micros = t0.elapsed().as_micros();
            debug!(size = domains.len(), micros = micros as u64, "batch classified");

            if tx_out.send(ClassifiedBatch { domains, result, micros }).is_err() {
                // Output channel closed
                break;
            }
        }

        info!("Classifier thread exiting (channel closed)");
    });

    match ready_rx.recv() {
        Ok(Ok(())) => Ok(ClassifierHandles { tx: tx_in, rx: rx_out, worker }),
        Ok(Err(e)) => {
            let _ = worker.join();
            Err(anyhow!("Failed to start classifier: {e}"))
        }
        Err(_) => {
            let _ = worker.join();
            Err(anyhow!("Classifier thread exited before reporting readiness"))
        }
    }
}
