use std::sync::Arc;

use lookbook_contracts::assets::ImageAsset;
pub use lookbook_contracts::events::GenerationPhase;
use lookbook_contracts::events::{EventWriter, SessionEvent};
use lookbook_contracts::gallery::{InFlightSlot, GALLERY_CAPACITY};
use tracing::{debug, info, warn};

use crate::backend::GenerationBackend;
use crate::config::DEFAULT_MAX_DIMENSION;
use crate::outcome::{FailureKind, GenerationResult};
use crate::prompt::compose_instruction;
use crate::resize::resize_pair;

pub const MISSING_IMAGES_MESSAGE: &str =
    "Please upload both a Model image and a Product image first.";
pub const GALLERY_FULL_MESSAGE: &str = "Maximum of 3 images allowed. Please clear a slot.";
pub const BUSY_MESSAGE: &str = "A generation is already in progress.";

#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub model_image: Option<ImageAsset>,
    pub product_image: Option<ImageAsset>,
    pub style_text: String,
}

impl GenerationRequest {
    pub fn new(
        model_image: Option<ImageAsset>,
        product_image: Option<ImageAsset>,
        style_text: impl Into<String>,
    ) -> Self {
        Self {
            model_image,
            product_image,
            style_text: style_text.into(),
        }
    }
}

/// Runs one generation: validate, resize, compose, request.
///
/// - at most one run at a time; a concurrent call is rejected as busy
/// - validation failures never reach the backend
/// - the backend's result is returned unchanged
pub struct GenerationOrchestrator {
    backend: Arc<dyn GenerationBackend>,
    max_dimension: u32,
    events: Option<EventWriter>,
    slot: InFlightSlot,
}

impl GenerationOrchestrator {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            max_dimension: DEFAULT_MAX_DIMENSION,
            events: None,
            slot: InFlightSlot::new(),
        }
    }

    pub fn with_max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    pub fn with_events(mut self, events: Option<EventWriter>) -> Self {
        self.events = events;
        self
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    pub fn events(&self) -> Option<&EventWriter> {
        self.events.as_ref()
    }

    pub fn in_flight(&self) -> &InFlightSlot {
        &self.slot
    }

    pub fn run_generation(
        &self,
        request: GenerationRequest,
        gallery_count: usize,
    ) -> GenerationResult {
        let Some(_guard) = self.slot.try_acquire() else {
            // The run in flight owns the state machine; only record the rejection.
            let result = GenerationResult::failure(FailureKind::Busy, BUSY_MESSAGE);
            self.record(terminal_event(&result));
            return result;
        };
        let result = self.run_acquired(request, gallery_count);
        info!(outcome = result.outcome_label(), "generation finished");
        self.record(terminal_event(&result));
        self.record(SessionEvent::Idle);
        result
    }

    fn run_acquired(&self, request: GenerationRequest, gallery_count: usize) -> GenerationResult {
        self.record(SessionEvent::Validating);
        let GenerationRequest {
            model_image,
            product_image,
            style_text,
        } = request;
        let (Some(model_image), Some(product_image)) = (model_image, product_image) else {
            return GenerationResult::failure(FailureKind::Validation, MISSING_IMAGES_MESSAGE);
        };
        if gallery_count >= GALLERY_CAPACITY {
            return GenerationResult::failure(FailureKind::Validation, GALLERY_FULL_MESSAGE);
        }

        self.record(SessionEvent::Resizing {
            max_dimension: self.max_dimension,
            model_bytes: model_image.len(),
            product_bytes: product_image.len(),
        });
        let (model_image, product_image) =
            resize_pair(model_image, product_image, self.max_dimension);

        self.record(SessionEvent::Composing {
            style_text: style_text.clone(),
        });
        let instruction = compose_instruction(&style_text);

        self.record(SessionEvent::Requesting {
            backend: self.backend.name().to_string(),
        });
        self.backend.generate(&model_image, &product_image, &instruction)
    }

    /// Logs phase changes and appends `event` to the session log, if any.
    pub(crate) fn record(&self, event: SessionEvent) {
        if let Some(phase) = event.phase() {
            debug!(%phase, "generation phase");
        }
        let Some(events) = self.events.as_ref() else {
            return;
        };
        if let Err(err) = events.emit(&event) {
            warn!(event = event.kind(), "failed writing event: {err:#}");
        }
    }
}

fn terminal_event(result: &GenerationResult) -> SessionEvent {
    match result {
        GenerationResult::Success { .. } => SessionEvent::Succeeded,
        GenerationResult::Refusal { .. } => SessionEvent::Refused {
            message: result.user_message().unwrap_or_default(),
        },
        GenerationResult::Failure { kind, reason } => {
            let failure_kind = kind.as_str().to_string();
            let message = reason.clone();
            match result.terminal_phase() {
                GenerationPhase::Rejected => SessionEvent::Rejected {
                    failure_kind,
                    message,
                },
                _ => SessionEvent::Failed {
                    failure_kind,
                    message,
                },
            }
        }
    }
}
