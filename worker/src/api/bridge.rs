use crate::api::model::{StatusResponse, SubmitResponse, UploadQuery};
use crate::jobs::JobPool;
use anyhow::Context;
use log::{info, warn};
use serde_json::json;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::{Json, WithStatus};
use warp::{Filter, Rejection, Reply};

const MAX_UPLOAD_BYTES: u64 = 64 * 1024 * 1024;

/// HTTP front of the job system: upload, poll, download.
pub struct ApiBridge {
    pool: JobPool,
    results_dir: PathBuf,
    uploads_dir: PathBuf,
}

impl ApiBridge {
    pub fn new(pool: JobPool, results_dir: PathBuf, uploads_dir: PathBuf) -> Self {
        Self {
            pool,
            results_dir,
            uploads_dir,
        }
    }

    pub fn routes(&self) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
        let pool = self.pool.clone();
        let pool_filter = warp::any().map(move || pool.clone());
        let uploads = self.uploads_dir.clone();
        let uploads_filter = warp::any().map(move || uploads.clone());

        let submit_route = warp::path("jobs")
            .and(warp::path::end())
            .and(warp::post())
            .and(warp::query::<UploadQuery>())
            .and(warp::body::content_length_limit(MAX_UPLOAD_BYTES))
            .and(warp::body::bytes())
            .and(pool_filter.clone())
            .and(uploads_filter)
            .map(
                |query: UploadQuery, body: Bytes, pool: JobPool, uploads_dir: PathBuf| {
                    submit_upload(query, &body, &pool, &uploads_dir)
                },
            );

        let status_route = warp::path!("status" / u64)
            .and(warp::get())
            .and(pool_filter)
            .map(|id: u64, pool: JobPool| job_status(id, &pool));

        let download_route = warp::path("download")
            .and(warp::get())
            .and(warp::fs::dir(self.results_dir.clone()));

        submit_route.or(status_route).or(download_route)
    }

    /// Serves the API until Ctrl+C.
    pub async fn serve(self, addr: SocketAddr) -> anyhow::Result<()> {
        let (bound, server) = warp::serve(self.routes())
            .try_bind_with_graceful_shutdown(addr, async {
                let _ = tokio::signal::ctrl_c().await;
            })
            .with_context(|| format!("binding job API on {}", addr))?;
        info!("job API listening on {} (Ctrl+C to stop)", bound);
        server.await;
        Ok(())
    }
}

fn detail(message: String, status: StatusCode) -> WithStatus<Json> {
    warp::reply::with_status(warp::reply::json(&json!({ "detail": message })), status)
}

/// Writes the body under a random name; the client name only picks the extension.
fn store_upload(uploads_dir: &Path, filename: &str, body: &[u8]) -> anyhow::Result<PathBuf> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or("json");
    fs::create_dir_all(uploads_dir)
        .with_context(|| format!("creating uploads dir {}", uploads_dir.display()))?;
    let path = uploads_dir.join(format!("{:016x}.{}", rand::random::<u64>(), extension));
    fs::write(&path, body).with_context(|| format!("storing upload {}", path.display()))?;
    Ok(path)
}

fn submit_upload(query: UploadQuery, body: &[u8], pool: &JobPool, uploads_dir: &Path) -> WithStatus<Json> {
    let original_filename = match Path::new(&query.filename).file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => {
            return detail(
                format!("invalid filename: {:?}", query.filename),
                StatusCode::BAD_REQUEST,
            )
        }
    };

    let input_path = match store_upload(uploads_dir, &original_filename, body) {
        Ok(path) => path,
        Err(err) => {
            warn!("upload of {} failed: {:#}", original_filename, err);
            return detail(format!("{:#}", err), StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let job = pool.store().create_named(input_path, original_filename);
    pool.submit(job.id);
    info!(
        "queued job {} for {} ({})",
        job.id,
        job.original_filename,
        job.input_path.display()
    );
    warp::reply::with_status(
        warp::reply::json(&SubmitResponse {
            message: format!("Successfully queued {}", job.original_filename),
            job_id: job.id,
        }),
        StatusCode::OK,
    )
}

fn job_status(id: u64, pool: &JobPool) -> WithStatus<Json> {
    match pool.store().get(id) {
        Some(job) => warp::reply::with_status(
            warp::reply::json(&StatusResponse::from(&job)),
            StatusCode::OK,
        ),
        None => detail("Job not found.".into(), StatusCode::NOT_FOUND),
    }
}
