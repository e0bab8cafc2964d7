pub mod common;
pub mod config;
pub mod graphql;
pub mod normalize;
pub mod observability;
pub mod pipeline;
pub mod server;

pub use common::{CoverageRecord, NormalizeError, RawRow};
pub use normalize::{normalize, NormalizeOptions};
