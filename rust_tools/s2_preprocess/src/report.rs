use crate::error::Result;
use log::{error, info, warn};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Period-level work outside any single item
    Setup,
    Extract,
    Stack,
    Clip,
    Mosaic,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Setup => "setup",
            Stage::Extract => "extract",
            Stage::Stack => "stack",
            Stage::Clip => "clip",
            Stage::Mosaic => "mosaic",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemOutcome {
    Done(Option<PathBuf>),
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemReport {
    pub item: String,
    pub outcome: ItemOutcome,
}

/// Outcomes of one stage over independent items
#[derive(Debug, Clone, PartialEq)]
pub struct BatchReport {
    pub stage: Stage,
    pub items: Vec<ItemReport>,
}

impl BatchReport {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            items: Vec::new(),
        }
    }

    fn push(&mut self, item: &str, outcome: ItemOutcome) {
        self.items.push(ItemReport {
            item: item.to_string(),
            outcome,
        });
    }

    pub fn record(&mut self, item: &str, result: Result<PathBuf>) {
        let outcome = match result {
            Ok(path) => ItemOutcome::Done(Some(path)),
            Err(e) => ItemOutcome::Failed(e.to_string()),
        };
        self.push(item, outcome);
    }

    /// `Ok(None)` is recorded as skipped with `reason`
    pub fn record_optional(&mut self, item: &str, result: Result<Option<PathBuf>>, reason: &str) {
        let outcome = match result {
            Ok(Some(path)) => ItemOutcome::Done(Some(path)),
            Ok(None) => ItemOutcome::Skipped(reason.to_string()),
            Err(e) => ItemOutcome::Failed(e.to_string()),
        };
        self.push(item, outcome);
    }

    pub fn record_done(&mut self, item: &str) {
        self.push(item, ItemOutcome::Done(None));
    }

    pub fn record_skip(&mut self, item: &str, reason: &str) {
        self.push(item, ItemOutcome::Skipped(reason.to_string()));
    }

    pub fn record_failure(&mut self, item: &str, message: &str) {
        self.push(item, ItemOutcome::Failed(message.to_string()));
    }

    pub fn done_count(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Done(_)))
    }

    pub fn skipped_count(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Skipped(_)))
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|i| pred(&i.outcome)).count()
    }
}

#[derive(Debug, Clone)]
pub struct PeriodReport {
    pub period: String,
    pub stages: Vec<BatchReport>,
    pub elapsed: Duration,
}

impl PeriodReport {
    pub fn new(period: &str) -> Self {
        Self {
            period: period.to_string(),
            stages: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Report for a period that could not be processed at all
    pub fn aborted(period: &str, message: &str) -> Self {
        let mut report = Self::new(period);
        let mut batch = BatchReport::new(Stage::Setup);
        batch.record_failure(period, message);
        report.stages.push(batch);
        report
    }

    pub fn stage(&self, stage: Stage) -> Option<&BatchReport> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    pub fn failed_count(&self) -> usize {
        self.stages.iter().map(BatchReport::failed_count).sum()
    }

    pub fn log_summary(&self) {
        info!("---------------------------------------------");
        for batch in &self.stages {
            info!(
                "{} / {}: {} done, {} skipped, {} failed",
                self.period,
                batch.stage,
                batch.done_count(),
                batch.skipped_count(),
                batch.failed_count()
            );
            for item in &batch.items {
                match &item.outcome {
                    ItemOutcome::Skipped(reason) => warn!("  skipped {}: {}", item.item, reason),
                    ItemOutcome::Failed(message) => error!("  failed {}: {}", item.item, message),
                    ItemOutcome::Done(_) => {}
                }
            }
        }
        info!("{} finished in {:.1?}", self.period, self.elapsed);
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub periods: Vec<PeriodReport>,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn failed_count(&self) -> usize {
        self.periods.iter().map(PeriodReport::failed_count).sum()
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    pub fn period(&self, name: &str) -> Option<&PeriodReport> {
        self.periods.iter().find(|p| p.period == name)
    }

    pub fn log_summary(&self) {
        for period in &self.periods {
            period.log_summary();
        }
        info!("---------------------------------------------");
        info!(
            "Pre-processing completed in {:.1?} with {} failed item(s)",
            self.elapsed,
            self.failed_count()
        );
    }
}
