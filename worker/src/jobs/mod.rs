pub mod pool;
pub mod store;

pub use pool::JobPool;
pub use store::{Job, JobStatus, JobStore};
