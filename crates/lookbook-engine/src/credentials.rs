use std::fmt;
use std::sync::Mutex;

use anyhow::{anyhow, bail, Result};

use crate::config::non_empty_env;

const DEFAULT_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// An API key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiCredential(String);

impl ApiCredential {
    pub fn new(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiCredential(***)")
    }
}

/// Where the generation client gets its key from.
///
/// Implementations are queried on every generation so a key chosen mid-session
/// takes effect on the next call.
pub trait CredentialSource: Send + Sync {
    fn active_credential(&self) -> Option<ApiCredential>;

    /// May block on user interaction.
    fn select_credential(&self) -> Result<()>;

    fn has_active_credential(&self) -> bool {
        self.active_credential().is_some()
    }
}

#[derive(Debug, Clone)]
pub struct EnvCredentials {
    keys: Vec<String>,
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::with_keys(DEFAULT_KEY_VARS)
    }
}

impl EnvCredentials {
    pub fn with_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }
}

impl CredentialSource for EnvCredentials {
    fn active_credential(&self) -> Option<ApiCredential> {
        self.keys
            .iter()
            .find_map(|key| non_empty_env(key))
            .and_then(ApiCredential::new)
    }

    fn select_credential(&self) -> Result<()> {
        bail!("{} not set", self.keys.join(" or "))
    }
}

pub type CredentialPrompt = Box<dyn Fn() -> Result<Option<String>> + Send + Sync>;

/// A key picked during the session, falling back to the environment.
pub struct SessionCredentials {
    selected: Mutex<Option<ApiCredential>>,
    fallback: EnvCredentials,
    prompt: Option<CredentialPrompt>,
}

impl SessionCredentials {
    pub fn new(fallback: EnvCredentials) -> Self {
        Self {
            selected: Mutex::new(None),
            fallback,
            prompt: None,
        }
    }

    pub fn with_prompt(mut self, prompt: CredentialPrompt) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Returns false when `raw` is blank; the previous selection is kept.
    pub fn set(&self, raw: &str) -> Result<bool> {
        let Some(credential) = ApiCredential::new(raw) else {
            return Ok(false);
        };
        let mut selected = self
            .selected
            .lock()
            .map_err(|_| anyhow!("credential lock poisoned"))?;
        *selected = Some(credential);
        Ok(true)
    }

    pub fn clear(&self) -> Result<()> {
        let mut selected = self
            .selected
            .lock()
            .map_err(|_| anyhow!("credential lock poisoned"))?;
        *selected = None;
        Ok(())
    }

    fn selected(&self) -> Option<ApiCredential> {
        self.selected.lock().ok().and_then(|guard| guard.clone())
    }
}

impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("selected", &self.selected().is_some())
            .field("fallback", &self.fallback)
            .field("interactive", &self.prompt.is_some())
            .finish()
    }
}

impl CredentialSource for SessionCredentials {
    fn active_credential(&self) -> Option<ApiCredential> {
        self.selected()
            .or_else(|| self.fallback.active_credential())
    }

    fn select_credential(&self) -> Result<()> {
        let Some(prompt) = self.prompt.as_ref() else {
            return self.fallback.select_credential();
        };
        if let Some(raw) = prompt()? {
            self.set(&raw)?;
        }
        Ok(())
    }
}
