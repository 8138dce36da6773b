pub mod annotate;
pub mod config;
pub mod driver;
pub mod error;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod registry;
pub mod stages;
pub mod telemetry;

pub use error::{LayoutError, Result};
