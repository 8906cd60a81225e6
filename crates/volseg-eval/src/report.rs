use std::collections::BTreeMap;

use derive_more::{Deref, From};
use serde::{Deserialize, Serialize};

use crate::dataset::DatasetIdentity;

/// Aggregated metrics of one dataset, keyed by metric name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Deref, From)]
pub struct MetricReport(BTreeMap<String, f64>);

impl MetricReport {
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.0)
    }
}

/// Receives the final metrics of every dataset.
pub trait ReportSink {
    fn report(&mut self, dataset: DatasetIdentity, report: &MetricReport);
}

/// Writes each metric as a `mean <name>: <value>` line through the `log` facade.
#[derive(Debug, Default)]
pub struct LogReportSink;

impl ReportSink for LogReportSink {
    fn report(&mut self, dataset: DatasetIdentity, report: &MetricReport) {
        log::info!("{dataset}");
        for (name, value) in report.iter() {
            if name == "volumes" {
                log::info!("volumes: {value}");
            } else {
                log::info!("mean {name}: {value:.4}");
            }
        }
    }
}

/// Keeps every report in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingReportSink {
    pub reports: Vec<(DatasetIdentity, MetricReport)>,
}

impl CollectingReportSink {
    pub fn get(&self, dataset: DatasetIdentity) -> Option<&MetricReport> {
        self.reports
            .iter()
            .rev()
            .find(|(d, _)| *d == dataset)
            .map(|(_, report)| report)
    }
}

impl ReportSink for CollectingReportSink {
    fn report(&mut self, dataset: DatasetIdentity, report: &MetricReport) {
        self.reports.push((dataset, report.clone()));
    }
}
