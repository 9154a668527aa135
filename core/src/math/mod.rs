pub mod geometry;
pub mod stats;

pub use geometry::{iou, BBox};
pub use stats::StatsHelper;
