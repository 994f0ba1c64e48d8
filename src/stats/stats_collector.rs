use std::collections::HashMap;

use super::StatsReportType;

#[derive(Debug, Default)]
pub struct StatsCollector {
    pub(crate) reports: HashMap<String, StatsReportType>,
}

impl StatsCollector {
    pub(crate) fn new() -> Self {
        StatsCollector {
            ..Default::default()
        }
    }

    pub(crate) fn insert(&mut self, stats: StatsReportType) {
        self.reports.insert(stats.id().to_owned(), stats);
    }

    pub(crate) fn into_reports(self) -> HashMap<String, StatsReportType> {
        self.reports
    }
}
