use std::sync::Arc;

use crate::cancel::Cancellation;
use crate::config::AppConfig;
use crate::services::{LanguageModelService, VersionControlService};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub version_control: Arc<dyn VersionControlService>,
    pub language_model: Arc<dyn LanguageModelService>,
    pub cancellation: Cancellation,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        version_control: Arc<dyn VersionControlService>,
        language_model: Arc<dyn LanguageModelService>,
        cancellation: Cancellation,
    ) -> Self {
        Self {
            config,
            version_control,
            language_model,
            cancellation,
        }
    }
}
