//! Application state.

use std::sync::Arc;

use vrender_models::CanonicalProfile;
use vrender_pipeline::{PipelineConfig, RenderPipeline};
use vrender_storage::{R2Client, R2Config};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub storage: Arc<R2Client>,
    pub pipeline: Arc<RenderPipeline>,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let storage = Arc::new(R2Client::new(R2Config::from_env()?));
        let pipeline = RenderPipeline::new(
            PipelineConfig::from_env(),
            CanonicalProfile::default(),
            Arc::clone(&storage),
        )?;

        Ok(Self {
            config,
            storage,
            pipeline: Arc::new(pipeline),
        })
    }
}
