use crate::jobs::store::{Job, JobStore};
use crate::workflow::runner::Runner;
use log::{info, warn};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// Runs whole videos on blocking threads, a bounded number at a time.
///
/// Each video gets its own collaborators and state; frames of one video are
/// never processed in parallel.
#[derive(Clone)]
pub struct JobPool {
    store: JobStore,
    runner: Arc<Runner>,
    permits: Arc<Semaphore>,
}

impl JobPool {
    pub fn new(store: JobStore, runner: Arc<Runner>) -> Self {
        let workers = runner.config().workers.max(1);
        Self {
            store,
            runner,
            permits: Arc::new(Semaphore::new(workers)),
        }
    }

    pub fn store(&self) -> &JobStore {
        &self.store
    }

    /// Queues a job; must be called from within a tokio runtime.
    pub fn submit(&self, id: u64) -> JoinHandle<()> {
        let pool = self.clone();
        tokio::spawn(async move {
            let _permit = match pool.permits.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    pool.store.fail(id, "worker pool closed".into());
                    return;
                }
            };
            let worker = pool.clone();
            if let Err(err) = tokio::task::spawn_blocking(move || worker.run(id)).await {
                pool.store.fail(id, format!("worker aborted: {}", err));
            }
        })
    }

    /// Processes one job to completion on the calling thread.
    pub fn run(&self, id: u64) -> Option<Job> {
        let job = self.store.mark_processing(id)?;
        let output = self.runner.config().output_path_for(id);
        info!("job {} processing {}", id, job.input_path.display());

        match self.runner.execute(&job.input_path, &output) {
            Ok(summary) => {
                info!(
                    "job {} completed: {} frames, {} occupied / {} capacity",
                    id, summary.frames, summary.final_counts.occupied, summary.final_counts.capacity
                );
                self.store.complete(id, summary.output)
            }
            Err(err) => {
                warn!("job {} failed: {:#}", id, err);
                self.store.fail(id, format!("{:#}", err))
            }
        }
    }
}
