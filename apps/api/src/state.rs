use std::sync::Arc;

use crate::analysis::pipeline::ResumeEngine;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything behind the engine is read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub engine: Arc<ResumeEngine>,
}
