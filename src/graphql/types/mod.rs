pub mod coverage;
pub mod snapshot;

pub use coverage::Coverage;
pub use snapshot::{SheetStatus, SnapshotStatus};
