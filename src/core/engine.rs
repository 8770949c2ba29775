use crate::core::{Pipeline, RunOutcome};
use crate::utils::error::Result;

/// Runs the stages of a pipeline in order: selection, roster, identifiers, generation, report.
pub struct DeclarationEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> DeclarationEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<RunOutcome> {
        // Select
        let Some(inputs) = self.pipeline.select_inputs().await? else {
            tracing::info!("Run cancelled during file selection");
            return Ok(RunOutcome::Cancelled);
        };
        tracing::info!("Group: {}", inputs.group_name);

        // Extract
        let records = self.pipeline.extract(&inputs).await?;
        tracing::info!("Read {} students from roster", records.len());

        // Transform
        let records = self.pipeline.transform(records).await?;

        // Load
        let summary = self.pipeline.load(&inputs, records).await?;
        tracing::info!(
            "Generated {}/{} declarations in {}",
            summary.succeeded,
            summary.total,
            summary.output_dir.display()
        );

        // Report
        self.pipeline.report(&summary).await?;

        Ok(RunOutcome::Completed(summary))
    }
}
