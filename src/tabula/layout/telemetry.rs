use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::tabula::layout::error::{LayoutError, Result};

/// Installs a formatting subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive` (e.g. `"debug"`) when the variable is unset.
pub fn init_tracing(default_directive: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .map_err(|err| LayoutError::Logging(err.to_string()))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|err| LayoutError::Logging(err.to_string()))
}
