mod azure;
mod demo;

use std::sync::Arc;

use aztui_core::catalog::RemoteCatalog;
use aztui_core::config::AppConfig;
use tracing::{info, warn};

pub use azure::AzureDevOpsCatalog;
pub use demo::DemoCatalog;

/// Catalog the session runs against, plus a note for the status line when it
/// is not the one the user asked for
pub fn select(config: &AppConfig, demo: bool) -> (Arc<dyn RemoteCatalog>, Option<String>) {
    if demo {
        info!("using demo catalog");
        return (Arc::new(DemoCatalog::new()), None);
    }
    match AzureDevOpsCatalog::new(config) {
        Ok(catalog) => {
            info!(org_url = config.org_url(), "using Azure DevOps catalog");
            (Arc::new(catalog), None)
        }
        Err(e) => {
            warn!(error = %e, "falling back to demo catalog");
            let note = format!("{}; showing demo data (run `aztui config`)", e);
            (Arc::new(DemoCatalog::new()), Some(note))
        }
    }
}
