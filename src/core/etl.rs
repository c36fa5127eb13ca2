use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Runs a pipeline's read, validate/score and report phases in order.
pub struct DedupEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> DedupEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<String> {
        if self.monitor.is_enabled() {
            tracing::info!("🔍 System monitoring enabled");
        }

        tracing::info!("Reading input");
        let records = self.pipeline.extract().await?;
        tracing::info!("Read {} client records", records.len());
        self.monitor.log_phase("Reading input");

        tracing::info!("Validating and duplicate detection");
        let result = self.pipeline.transform(records).await?;
        self.monitor.log_phase("Duplicate detection");

        tracing::info!("Writing report");
        let output = self.pipeline.load(result).await?;
        self.monitor.log_phase("Writing report");

        self.monitor.log_final_stats();
        Ok(output)
    }
}
