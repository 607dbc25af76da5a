use std::sync::Arc;

use crate::config::Config;
use crate::extraction::catalogue::Catalogue;
use crate::pipeline::ResumeProcessor;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<ResumeProcessor>,
    /// Read-only field catalogue shared by extraction and maintenance.
    pub catalogue: &'static Catalogue,
    pub config: Config,
}
