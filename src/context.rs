use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{CompletionService, WorkApiService};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub work_api: Arc<dyn WorkApiService>,
    pub language_model: Arc<dyn CompletionService>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        work_api: Arc<dyn WorkApiService>,
        language_model: Arc<dyn CompletionService>,
    ) -> Self {
        Self {
            config,
            work_api,
            language_model,
        }
    }
}
