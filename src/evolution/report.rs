//! Reporting sinks for generation boundaries.
//!
//! One-way observation channel: the controller pushes, nothing reads back.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Receives boundary statistics and published values
pub trait ReportSink: Send {
    /// Mean fitness of the generation that just finished
    fn on_average_fitness(&mut self, _generation: u64, _average: f64) {}

    fn on_landed(&mut self, _landed: usize, _success_rate: f64) {}

    /// Called only when the fittest score changes
    fn on_fittest(&mut self, _fittest: f64) {}

    /// New generation number after a boundary or restart
    fn on_generation(&mut self, _generation: u64) {}
}

/// Logs every report through `tracing`
#[derive(Clone, Debug, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn on_average_fitness(&mut self, generation: u64, average: f64) {
        info!("📈 [Report] Generation {} average fitness {:.3}", generation, average);
    }

    fn on_landed(&mut self, landed: usize, success_rate: f64) {
        info!("🚀 [Report] Landed {} (success rate {:.3}%)", landed, success_rate * 100.0);
    }

    fn on_fittest(&mut self, fittest: f64) {
        info!("🥇 [Report] Fittest {:.3}", fittest);
    }

    fn on_generation(&mut self, generation: u64) {
        info!("🔁 [Report] Generation {}", generation);
    }
}

/// A single recorded report
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ReportEvent {
    AverageFitness { generation: u64, average: f64 },
    Landed { landed: usize, success_rate: f64 },
    Fittest(f64),
    Generation(u64),
}

/// Shared in-memory recorder.
///
/// Clones share one buffer, so a driver can hand one clone to the
/// controller and read reports from another.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    inner: Arc<RwLock<Vec<ReportEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ReportEvent> {
        self.inner.read().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// (generation, average fitness) series
    pub fn average_fitness(&self) -> Vec<(u64, f64)> {
        self.inner
            .read()
            .iter()
            .filter_map(|e| match e {
                ReportEvent::AverageFitness { generation, average } => Some((*generation, *average)),
                _ => None,
            })
            .collect()
    }

    pub fn fittest(&self) -> Vec<f64> {
        self.inner
            .read()
            .iter()
            .filter_map(|e| match e {
                ReportEvent::Fittest(f) => Some(*f),
                _ => None,
            })
            .collect()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&*self.inner.read()).unwrap_or_else(|_| "[]".to_string())
    }

    fn push(&self, event: ReportEvent) {
        self.inner.write().push(event);
    }
}

impl ReportSink for MemorySink {
    fn on_average_fitness(&mut self, generation: u64, average: f64) {
        self.push(ReportEvent::AverageFitness { generation, average });
    }

    fn on_landed(&mut self, landed: usize, success_rate: f64) {
        self.push(ReportEvent::Landed { landed, success_rate });
    }

    fn on_fittest(&mut self, fittest: f64) {
        self.push(ReportEvent::Fittest(fittest));
    }

    fn on_generation(&mut self, generation: u64) {
        self.push(ReportEvent::Generation(generation));
    }
}
