use crate::interface::{Frame, VideoProperties};
use crate::pipeline::overlay::FrameOverlay;
use crate::prelude::{DetectorAdapter, EngineConfig, FrameSink, FrameSource, ParkResult, Tracker};
use crate::processing::{FrameReport, FrameState, SmoothedCounts};
use crate::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use std::path::PathBuf;

/// Result of a video processed to the end of its stream.
#[derive(Debug, Clone)]
pub struct VideoSummary {
    pub output: PathBuf,
    pub frames: u64,
    pub properties: VideoProperties,
    pub final_counts: SmoothedCounts,
    pub metrics: MetricsSnapshot,
}

/// Runs the sequential per-frame chain for whole videos.
///
/// Detector and tracker are injected; one processor handles one video at a
/// time and keeps no state between videos apart from the collaborators.
pub struct VideoProcessor<D, T> {
    detector: D,
    tracker: T,
    config: EngineConfig,
}

impl<D: DetectorAdapter, T: Tracker> VideoProcessor<D, T> {
    pub fn new(detector: D, tracker: T, config: EngineConfig) -> Self {
        Self {
            detector,
            tracker,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn into_parts(self) -> (D, T) {
        (self.detector, self.tracker)
    }

    /// Processes `source` until end of stream, writing one overlay per frame.
    ///
    /// The first error aborts the video; the sink is then left unfinished and
    /// no summary is produced.
    pub fn process_video<S, K>(
        &mut self,
        name: &str,
        source: &mut S,
        sink: &mut K,
    ) -> ParkResult<VideoSummary>
    where
        S: FrameSource,
        K: FrameSink,
    {
        let logger = LogManager::for_video(name);
        let metrics = MetricsRecorder::new();
        let properties = source.properties(&self.config);
        let mut state = FrameState::new(self.config.clone(), &properties);
        logger.record(&format!(
            "starting {}x{} @ {:.2} fps, promotion after {} frames",
            properties.width,
            properties.height,
            properties.fps,
            self.config.hysteresis_frames(properties.fps)
        ));

        let outcome = self
            .drain(&mut state, &properties, source, sink, &logger, &metrics)
            .and_then(|()| sink.finish());
        let output = match outcome {
            Ok(output) => output,
            Err(err) => {
                metrics.record_error();
                logger.record_failure(state.frames(), &err);
                return Err(err);
            }
        };

        let summary = VideoSummary {
            output,
            frames: state.frames(),
            properties,
            final_counts: state.smoothed(),
            metrics: metrics.snapshot(),
        };
        logger.record(&format!(
            "finished {} frames -> {} ({:?})",
            summary.frames,
            summary.output.display(),
            summary.metrics
        ));
        Ok(summary)
    }

    fn drain<S, K>(
        &mut self,
        state: &mut FrameState,
        properties: &VideoProperties,
        source: &mut S,
        sink: &mut K,
        logger: &LogManager,
        metrics: &MetricsRecorder,
    ) -> ParkResult<()>
    where
        S: FrameSource,
        K: FrameSink,
    {
        while let Some(frame) = source.next_frame()? {
            let (injected, report) = self.process_frame(state, &frame, properties, sink)?;
            logger.record_frame(frame.index, injected, &report);
            metrics.record_frame(injected, &report);
        }
        Ok(())
    }

    /// detect -> inject -> track -> reconcile -> render, for a single frame.
    pub fn process_frame<K: FrameSink>(
        &mut self,
        state: &mut FrameState,
        frame: &Frame,
        properties: &VideoProperties,
        sink: &mut K,
    ) -> ParkResult<(usize, FrameReport)> {
        let mut detections = self.detector.detect(frame)?;
        let injected = state.inject(&mut detections);
        let tracks = self.tracker.update(&detections.into_all(), frame)?;
        let report = state.reconcile(&tracks);
        let overlay = FrameOverlay::build(frame.index, state, &report, properties);
        sink.write(frame, &overlay)?;
        Ok((injected, report))
    }
}
