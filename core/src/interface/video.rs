use serde::{Deserialize, Serialize};

/// One decoded frame at native resolution.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// 1-based position in the stream.
    pub index: u64,
    pub width: u32,
    pub height: u32,
    /// Packed pixel data; empty when the source carries no imagery.
    pub data: Vec<u8>,
}

impl Frame {
    pub fn blank(index: u64, width: u32, height: u32) -> Self {
        Self {
            index,
            width,
            height,
            data: Vec::new(),
        }
    }
}

/// Stream properties fixed for the lifetime of one video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoProperties {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Detector-resolution to native-resolution factors.
    pub scale_x: f64,
    pub scale_y: f64,
}

impl VideoProperties {
    pub fn new(width: u32, height: u32, fps: f64, detection_width: u32, detection_height: u32) -> Self {
        Self {
            width,
            height,
            fps,
            scale_x: width as f64 / detection_width.max(1) as f64,
            scale_y: height as f64 / detection_height.max(1) as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_factors_map_detector_space_to_native() {
        let props = VideoProperties::new(1920, 1080, 30.0, 640, 640);
        assert_eq!(props.scale_x, 3.0);
        assert_eq!(props.scale_y, 1.6875);
    }
}
