use crate::adapters::{IouTracker, JsonlOverlaySink, Recording};
use crate::workflow::config::WorkerConfig;
use anyhow::Context;
use log::debug;
use parkcore::{VideoProcessor, VideoSummary};
use std::fs;
use std::path::Path;

/// Processes one recorded video end to end.
#[derive(Clone)]
pub struct Runner {
    config: WorkerConfig,
}

impl Runner {
    pub fn new(config: WorkerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Builds fresh collaborators for the video, so concurrent runs share nothing.
    pub fn execute(&self, input: &Path, output: &Path) -> anyhow::Result<VideoSummary> {
        let recording = Recording::load(input)
            .with_context(|| format!("opening input {}", input.display()))?;
        let (mut source, detector) = recording.into_parts();
        let mut sink = JsonlOverlaySink::create(output)
            .with_context(|| format!("opening output {}", output.display()))?;
        let tracker = IouTracker::new(self.config.tracker.clone());
        let mut processor = VideoProcessor::new(detector, tracker, self.config.engine.clone());

        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| input.display().to_string());
        match processor.process_video(&name, &mut source, &mut sink) {
            Ok(summary) => {
                let (_, tracker) = processor.into_parts();
                debug!("{}: {} tracks alive at end of stream", name, tracker.live_tracks());
                Ok(summary)
            }
            Err(err) => {
                drop(sink);
                // no partial artifact for a failed video
                let _ = fs::remove_file(output);
                Err(err).with_context(|| format!("processing {}", input.display()))
            }
        }
    }
}
