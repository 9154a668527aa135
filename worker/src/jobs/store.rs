use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// One submitted video and its processing outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    pub original_filename: String,
    pub input_path: PathBuf,
    pub output_path: Option<PathBuf>,
    pub status: JobStatus,
    pub error: Option<String>,
    /// Seconds since the Unix epoch.
    pub created_at: u64,
    pub updated_at: Option<u64>,
}

#[derive(Default)]
struct JobTable {
    jobs: HashMap<u64, Job>,
    last_id: u64,
}

/// In-memory job records shared between the API and the worker pool.
#[derive(Clone, Default)]
pub struct JobStore {
    inner: Arc<RwLock<JobTable>>,
}

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, input_path: PathBuf) -> Job {
        let original_filename = input_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.create_named(input_path, original_filename)
    }

    /// Records a job whose stored input name differs from the client's.
    pub fn create_named(&self, input_path: PathBuf, original_filename: String) -> Job {
        let mut table = self.inner.write().unwrap_or_else(|p| p.into_inner());
        table.last_id += 1;
        let job = Job {
            id: table.last_id,
            original_filename,
            input_path,
            output_path: None,
            status: JobStatus::Pending,
            error: None,
            created_at: now(),
            updated_at: None,
        };
        table.jobs.insert(job.id, job.clone());
        job
    }

    pub fn get(&self, id: u64) -> Option<Job> {
        let table = self.inner.read().unwrap_or_else(|p| p.into_inner());
        table.jobs.get(&id).cloned()
    }

    pub fn mark_processing(&self, id: u64) -> Option<Job> {
        self.update(id, |job| job.status = JobStatus::Processing)
    }

    pub fn complete(&self, id: u64, output_path: PathBuf) -> Option<Job> {
        self.update(id, |job| {
            job.status = JobStatus::Completed;
            job.output_path = Some(output_path);
        })
    }

    pub fn fail(&self, id: u64, error: String) -> Option<Job> {
        self.update(id, |job| {
            job.status = JobStatus::Failed;
            job.error = Some(error);
        })
    }

    fn update<F: FnOnce(&mut Job)>(&self, id: u64, apply: F) -> Option<Job> {
        let mut table = self.inner.write().unwrap_or_else(|p| p.into_inner());
        let job = table.jobs.get_mut(&id)?;
        apply(job);
        job.updated_at = Some(now());
        Some(job.clone())
    }
}
