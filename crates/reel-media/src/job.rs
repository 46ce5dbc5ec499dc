//! Per-invocation pipeline job with structured lifecycle logging.

use reel_models::JobId;
use std::time::Instant;
use tracing::{error, info, Span};

/// One pipeline invocation.
///
/// Owned by the call that created it and never shared; carries the job id and
/// operation name into every log line and span.
#[derive(Debug)]
pub struct PipelineJob {
    id: JobId,
    operation: &'static str,
    started: Instant,
}

impl PipelineJob {
    pub fn new(operation: &'static str) -> Self {
        Self {
            id: JobId::new(),
            operation,
            started: Instant::now(),
        }
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Span to instrument the invocation's future with.
    pub fn span(&self) -> Span {
        tracing::info_span!(
            "pipeline",
            job_id = %self.id,
            operation = self.operation
        )
    }

    /// Log the start of the pipeline.
    pub fn log_start(&self, message: &str) {
        info!(
            job_id = %self.id,
            operation = self.operation,
            "Pipeline started: {}", message
        );
    }

    /// Log an intermediate step.
    pub fn log_progress(&self, message: &str) {
        info!(
            job_id = %self.id,
            operation = self.operation,
            "Pipeline progress: {}", message
        );
    }

    /// Log a failure before it propagates.
    pub fn log_error(&self, message: &str) {
        error!(
            job_id = %self.id,
            operation = self.operation,
            elapsed_secs = self.started.elapsed().as_secs_f64(),
            "Pipeline failed: {}", message
        );
    }

    /// Log successful completion.
    pub fn log_completion(&self, output: &str) {
        info!(
            job_id = %self.id,
            operation = self.operation,
            elapsed_secs = self.started.elapsed().as_secs_f64(),
            "Pipeline completed: {}", output
        );
        metrics::counter!("reel_pipelines_completed_total", "operation" => self.operation)
            .increment(1);
    }

    /// Log the outcome of a finished pipeline and hand it back.
    pub fn finish<T: std::fmt::Display, E: std::fmt::Display>(
        &self,
        result: Result<T, E>,
    ) -> Result<T, E> {
        match &result {
            Ok(output) => self.log_completion(&output.to_string()),
            Err(e) => {
                self.log_error(&e.to_string());
                metrics::counter!("reel_pipelines_failed_total", "operation" => self.operation)
                    .increment(1);
            }
        }
        result
    }
}
