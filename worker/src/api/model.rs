use crate::jobs::{Job, JobStatus};
use serde::{Deserialize, Serialize};

/// Query of an upload: the client's name for the recording in the body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadQuery {
    pub filename: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub message: String,
    pub job_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub job_id: u64,
    pub status: JobStatus,
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&Job> for StatusResponse {
    fn from(job: &Job) -> Self {
        let result_filename = match job.status {
            JobStatus::Completed => job
                .output_path
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned()),
            _ => None,
        };
        let error = match job.status {
            JobStatus::Failed => job.error.clone(),
            _ => None,
        };
        Self {
            job_id: job.id,
            status: job.status,
            created_at: job.created_at,
            result_filename,
            error,
        }
    }
}
