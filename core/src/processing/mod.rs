pub mod frame_state;
pub mod frame_view;
pub mod injection;
pub mod occupancy;
pub mod smoother;

pub use frame_state::{FrameReport, FrameState};
pub use frame_view::{FrameView, Observation};
pub use injection::inject_persistent_occupancy;
pub use occupancy::{OccupancyMachine, Transitions};
pub use smoother::{SmoothedCounts, TemporalSmoother};
