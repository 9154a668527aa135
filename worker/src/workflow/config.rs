use crate::adapters::tracker::TrackerConfig;
use anyhow::Context;
use parkcore::EngineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    pub engine: EngineConfig,
    pub tracker: TrackerConfig,
    pub results_dir: PathBuf,
    /// Videos processed concurrently by the job pool.
    pub workers: usize,
    pub bind: SocketAddr,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            tracker: TrackerConfig::default(),
            results_dir: PathBuf::from("data/results"),
            workers: 2,
            bind: SocketAddr::from(([127, 0, 0, 1], 9000)),
        }
    }
}

impl WorkerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading worker config {}", path_ref.display()))?;
        let config: WorkerConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing worker config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(results_dir: PathBuf, workers: usize) -> Self {
        Self {
            results_dir,
            workers: workers.max(1),
            ..Default::default()
        }
    }

    /// Output artifact for a job, inside the results directory.
    pub fn output_path_for(&self, job_id: u64) -> PathBuf {
        self.results_dir.join(format!("{}_processed.jsonl", job_id))
    }

    /// Uploaded recordings live next to the results directory.
    pub fn uploads_dir(&self) -> PathBuf {
        self.results_dir
            .parent()
            .unwrap_or_else(|| Path::new(""))
            .join("uploads")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_keeps_engine_defaults() {
        let cfg = WorkerConfig::from_args(PathBuf::from("out"), 0);
        assert_eq!(cfg.workers, 1);
        assert_eq!(cfg.engine.history_capacity, 30);
        assert_eq!(cfg.output_path_for(7), PathBuf::from("out/7_processed.jsonl"));
        assert_eq!(cfg.uploads_dir(), PathBuf::from("uploads"));
        assert_eq!(WorkerConfig::default().uploads_dir(), PathBuf::from("data/uploads"));
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"workers: 4\nresults_dir: /tmp/lot\nengine:\n  hysteresis_seconds: 1.0\ntracker:\n  n_init: 2\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkerConfig::load(&path).unwrap();
        assert_eq!(cfg.workers, 4);
        assert_eq!(cfg.results_dir, PathBuf::from("/tmp/lot"));
        assert_eq!(cfg.engine.hysteresis_seconds, 1.0);
        assert_eq!(cfg.engine.match_iou, 0.5);
        assert_eq!(cfg.tracker.n_init, 2);
        assert_eq!(cfg.tracker.max_age, 100);
    }

    #[test]
    fn config_load_reports_missing_file() {
        let err = WorkerConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("reading worker config"));
    }
}
