//! Application state management

use std::sync::Arc;

use crate::batch::BatchProcessor;
use crate::config::Config;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    processor: BatchProcessor,
}

impl AppState {
    pub fn new(config: Config, processor: BatchProcessor) -> Self {
        Self {
            inner: Arc::new(AppStateInner { config, processor }),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the batch processor
    pub fn processor(&self) -> &BatchProcessor {
        &self.inner.processor
    }
}
