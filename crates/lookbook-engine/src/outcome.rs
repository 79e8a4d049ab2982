use std::fmt;

use lookbook_contracts::assets::ImageAsset;
use lookbook_contracts::events::GenerationPhase;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Missing input image or full gallery; nothing was sent.
    Validation,
    /// Another generation is still in flight.
    Busy,
    /// No key selected, or the service rejected the key.
    Credential,
    /// Network, HTTP status or response decoding error.
    Transport,
    /// The service answered without an image or any text.
    EmptyResponse,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Validation => "validation",
            FailureKind::Busy => "busy",
            FailureKind::Credential => "credential",
            FailureKind::Transport => "transport",
            FailureKind::EmptyResponse => "empty_response",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationResult {
    Success { image: ImageAsset },
    Refusal { explanation: String },
    Failure { kind: FailureKind, reason: String },
}

impl GenerationResult {
    pub fn failure(kind: FailureKind, reason: impl Into<String>) -> Self {
        GenerationResult::Failure {
            kind,
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResult::Success { .. })
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            GenerationResult::Failure { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// `data:image/png;base64,...` for a successful result.
    pub fn image_data_url(&self) -> Option<String> {
        match self {
            GenerationResult::Success { image } => Some(image.to_data_url()),
            _ => None,
        }
    }

    /// Text shown to the user when the result is not an image.
    pub fn user_message(&self) -> Option<String> {
        match self {
            GenerationResult::Success { .. } => None,
            GenerationResult::Refusal { explanation } => {
                Some(format!("Model Refusal: {explanation}..."))
            }
            GenerationResult::Failure { reason, .. } => Some(reason.clone()),
        }
    }

    /// The step a run ends on before returning to idle.
    pub fn terminal_phase(&self) -> GenerationPhase {
        match self {
            GenerationResult::Success { .. } => GenerationPhase::Succeeded,
            GenerationResult::Refusal { .. } => GenerationPhase::Refused,
            GenerationResult::Failure {
                kind: FailureKind::Validation | FailureKind::Busy,
                ..
            } => GenerationPhase::Rejected,
            GenerationResult::Failure { .. } => GenerationPhase::Failed,
        }
    }

    /// `succeeded`, `refused`, `rejected` or `failed`.
    pub fn outcome_label(&self) -> &'static str {
        self.terminal_phase().as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_messages_follow_result_kind() {
        let image = GenerationResult::Success {
            image: ImageAsset::new(b"hello".to_vec(), "image/png"),
        };
        assert_eq!(image.user_message(), None);
        assert_eq!(
            image.image_data_url().as_deref(),
            Some("data:image/png;base64,aGVsbG8=")
        );

        let refusal = GenerationResult::Refusal {
            explanation: "I can't help with that".to_string(),
        };
        assert_eq!(
            refusal.user_message().as_deref(),
            Some("Model Refusal: I can't help with that...")
        );
        assert!(refusal.image_data_url().is_none());

        let failure = GenerationResult::failure(FailureKind::Transport, "boom");
        assert_eq!(failure.user_message().as_deref(), Some("boom"));
        assert_eq!(failure.failure_kind(), Some(FailureKind::Transport));
    }

    #[test]
    fn outcome_labels_match_terminal_phases() {
        assert_eq!(
            GenerationResult::failure(FailureKind::Validation, "x").outcome_label(),
            "rejected"
        );
        assert_eq!(
            GenerationResult::failure(FailureKind::Busy, "x").outcome_label(),
            "rejected"
        );
        assert_eq!(
            GenerationResult::failure(FailureKind::EmptyResponse, "x").outcome_label(),
            "failed"
        );
        assert_eq!(
            GenerationResult::Refusal {
                explanation: String::new()
            }
            .outcome_label(),
            "refused"
        );
    }
}
