use crate::core::Pipeline;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

/// Runs a pipeline's extract, transform and load phases in order.
///
/// A failure in any phase ends the run; nothing is written unless every
/// phase before load succeeded.
pub struct MapEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> MapEngine<P> {
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
        tracing::info!("Starting map render");
        self.monitor.log_stats("Start");

        tracing::info!("Loading geo and finance data...");
        let inputs = self.pipeline.extract().await?;
        tracing::info!(
            "Loaded {} regions, {} finance years",
            inputs.regions.len(),
            inputs.dataset.years.len()
        );
        self.monitor.log_stats("Extract");

        tracing::info!("Binding finance data to regions...");
        let rendered = self.pipeline.transform(inputs).await?;
        tracing::info!("Rendered {} year(s)", rendered.years.len());
        self.monitor.log_stats("Transform");

        tracing::info!("Writing renderer output...");
        let output_path = self.pipeline.load(rendered).await?;
        tracing::info!("Output saved to: {}", output_path);
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(output_path)
    }
}
