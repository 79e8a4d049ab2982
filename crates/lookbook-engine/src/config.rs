use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_MAX_DIMENSION: u32 = 1024;
const MIN_MAX_DIMENSION: u32 = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct StudioConfig {
    pub api_base: String,
    pub image_model: String,
    pub max_dimension: u32,
    /// `None` leaves the request without a client-side deadline.
    pub request_timeout: Option<Duration>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            max_dimension: DEFAULT_MAX_DIMENSION,
            request_timeout: None,
        }
    }
}

impl StudioConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let api_base = read("GEMINI_API_BASE")
            .map(|value| value.trim_end_matches('/').to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or(defaults.api_base);
        let image_model = read("LOOKBOOK_IMAGE_MODEL").unwrap_or(defaults.image_model);
        let max_dimension = read("LOOKBOOK_MAX_DIMENSION")
            .and_then(|value| value.parse::<u32>().ok())
            .filter(|value| *value >= MIN_MAX_DIMENSION)
            .unwrap_or(defaults.max_dimension);
        let request_timeout = read("LOOKBOOK_REQUEST_TIMEOUT_SECS")
            .and_then(|value| value.parse::<f64>().ok())
            .filter(|value| *value > 0.0)
            .and_then(|value| Duration::try_from_secs_f64(value).ok());

        Self {
            api_base,
            image_model,
            max_dimension,
            request_timeout,
        }
    }

    pub fn with_image_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
        {
            self.image_model = model;
        }
        self
    }

    pub fn endpoint(&self) -> String {
        let trimmed = self.image_model.trim();
        let model_path = if trimmed.starts_with("models/") {
            trimmed.to_string()
        } else {
            format!("models/{trimmed}")
        };
        format!("{}/{}:generateContent", self.api_base, model_path)
    }
}

pub(crate) fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
