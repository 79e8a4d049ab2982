use std::sync::Arc;

use lookbook_contracts::assets::ImageAsset;
use tracing::warn;

use crate::client::GeminiClient;
use crate::config::StudioConfig;
use crate::credentials::CredentialSource;
use crate::outcome::{FailureKind, GenerationResult};

pub const MISSING_CREDENTIAL_REASON: &str =
    "No API key selected. Select a key (/key) or set GEMINI_API_KEY.";

/// Turns two prepared images and an instruction into a result. Errors are
/// reported through the result, never raised.
pub trait GenerationBackend: Send + Sync {
    fn name(&self) -> &str;

    fn generate(
        &self,
        model_image: &ImageAsset,
        product_image: &ImageAsset,
        instruction: &str,
    ) -> GenerationResult;
}

pub struct GeminiBackend {
    config: StudioConfig,
    credentials: Arc<dyn CredentialSource>,
}

impl GeminiBackend {
    pub fn new(config: StudioConfig, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            config,
            credentials,
        }
    }

    pub fn config(&self) -> &StudioConfig {
        &self.config
    }
}

impl GenerationBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn generate(
        &self,
        model_image: &ImageAsset,
        product_image: &ImageAsset,
        instruction: &str,
    ) -> GenerationResult {
        let Some(credential) = self.credentials.active_credential() else {
            warn!("generation attempted without an active credential");
            return GenerationResult::failure(FailureKind::Credential, MISSING_CREDENTIAL_REASON);
        };
        // Built per call: the selected key may have changed since the last one.
        match GeminiClient::new(&self.config, credential) {
            Ok(client) => client.generate(model_image, product_image, instruction),
            Err(err) => GenerationResult::failure(FailureKind::Transport, format!("{err:#}")),
        }
    }
}
