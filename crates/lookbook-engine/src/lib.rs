//! Virtual photo-shoot engine: prepares a model photo and a product photo,
//! asks Gemini for a composite and keeps the results in a small gallery.

pub mod backend;
pub mod client;
pub mod config;
pub mod credentials;
pub mod intake;
pub mod orchestrator;
pub mod outcome;
pub mod prompt;
pub mod resize;
pub mod studio;

#[cfg(test)]
mod test_support;

pub use backend::{GeminiBackend, GenerationBackend};
pub use config::StudioConfig;
pub use credentials::{ApiCredential, CredentialSource, EnvCredentials, SessionCredentials};
pub use intake::load_image_asset;
pub use orchestrator::{GenerationOrchestrator, GenerationPhase, GenerationRequest};
pub use outcome::{FailureKind, GenerationResult};
pub use studio::Studio;
