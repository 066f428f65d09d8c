//! Interval scheduler for background jobs.

use super::context::JobContext;
use super::job::{BackgroundJob, JobError};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Runs each registered job on its own interval until shutdown.
///
/// Job bodies are blocking and execute on the blocking thread pool. Shutdown
/// cancels the shared token; a running job notices it via
/// `ctx.is_cancelled()` between units of work, and the scheduler waits for
/// in-flight jobs before returning.
pub struct JobScheduler {
    jobs: Vec<Arc<dyn BackgroundJob>>,
    context: JobContext,
    shutdown_token: CancellationToken,
}

impl JobScheduler {
    pub fn new(context: JobContext, shutdown_token: CancellationToken) -> Self {
        Self {
            jobs: Vec::new(),
            context,
            shutdown_token,
        }
    }

    pub fn register_job(&mut self, job: Arc<dyn BackgroundJob>) {
        info!("Registering job: {} - {}", job.id(), job.description());
        self.jobs.push(job);
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Main scheduler loop. Each job runs once at startup, then sleeps its
    /// interval between runs.
    pub async fn run(self) {
        info!("Starting job scheduler with {} registered jobs", self.jobs.len());

        let mut handles: Vec<JoinHandle<()>> = Vec::new();
        for job in &self.jobs {
            let job = Arc::clone(job);
            let ctx = self.context.clone();
            let shutdown = self.shutdown_token.clone();

            handles.push(tokio::spawn(async move {
                let interval = job.schedule().interval();
                loop {
                    let run_job = Arc::clone(&job);
                    let run_ctx = ctx.clone();
                    let started = Instant::now();
                    let result =
                        tokio::task::spawn_blocking(move || run_job.execute(&run_ctx)).await;

                    match result {
                        Ok(Ok(())) => {
                            info!("Job {} completed in {:?}", job.id(), started.elapsed())
                        }
                        Ok(Err(JobError::Cancelled)) => {
                            warn!("Job {} cancelled", job.id());
                            break;
                        }
                        Ok(Err(e)) => error!("Job {} failed: {}", job.id(), e),
                        Err(e) => error!("Job {} panicked: {}", job.id(), e),
                    }

                    tokio::select! {
                        _ = tokio::time::sleep(interval) => {}
                        _ = shutdown.cancelled() => break,
                    }
                }
            }));
        }

        self.shutdown_token.cancelled().await;
        info!("Scheduler received shutdown signal, waiting for running jobs");
        for handle in handles {
            let _ = handle.await;
        }
        info!("Job scheduler stopped");
    }
}
