use parkcore::interface::Frame;
use parkcore::{FrameOverlay, FrameSink, ParkError, ParkResult};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes one JSON overlay per line.
pub struct JsonlOverlaySink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonlOverlaySink {
    pub fn create<P: AsRef<Path>>(path: P) -> ParkResult<Self> {
        let path = path.as_ref().to_path_buf();
        let open_error = |err: std::io::Error| ParkError::SinkOpen(format!("{}: {}", path.display(), err));
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(open_error)?;
        }
        let file = File::create(&path).map_err(open_error)?;
        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }
}

impl FrameSink for JsonlOverlaySink {
    fn write(&mut self, _frame: &Frame, overlay: &FrameOverlay) -> ParkResult<()> {
        serde_json::to_writer(&mut self.writer, overlay)
            .map_err(|err| ParkError::Sink(err.to_string()))?;
        self.writer
            .write_all(b"\n")
            .map_err(|err| ParkError::Sink(err.to_string()))
    }

    fn finish(&mut self) -> ParkResult<PathBuf> {
        self.writer
            .flush()
            .map_err(|err| ParkError::Sink(err.to_string()))?;
        Ok(self.path.clone())
    }
}
