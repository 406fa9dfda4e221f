use crate::domain::model::DashboardPage;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outputs: Vec<String>,
    /// false when the diagnostic page was rendered instead of the dashboard
    pub data_available: bool,
}

pub struct DashboardEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> DashboardEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Loads once, aggregates, renders. A failed load still renders the
    /// diagnostic page; only output errors are returned.
    pub fn run(&self) -> Result<RunReport> {
        tracing::info!("🚀 Starting dashboard build");

        let loaded = self.pipeline.extract();
        self.monitor.log_phase("Load");

        let (outputs, data_available) = match loaded {
            Ok(bundle) => {
                let report = self.pipeline.transform(&bundle);
                tracing::info!(
                    "📈 {} project(s), {} of {} region(s) with projects, {} year(s)",
                    report.summary.total_projects,
                    report.summary.regions_with_projects,
                    report.regions.len(),
                    report.years.len()
                );
                self.monitor.log_phase("Aggregate");

                (self.pipeline.load(&DashboardPage::Ready(report))?, true)
            }
            Err(unavailable) => {
                tracing::warn!("⚠️ Rendering diagnostic page: {}", unavailable.message);
                (self.pipeline.load(&DashboardPage::Unavailable(unavailable))?, false)
            }
        };

        self.monitor.log_phase("Render");
        self.monitor.log_final_stats();

        Ok(RunReport {
            outputs,
            data_available,
        })
    }
}
