use anyhow::{bail, Result};
use lookbook_contracts::assets::ImageAsset;
use lookbook_contracts::events::SessionEvent;
use lookbook_contracts::gallery::{Gallery, GalleryEntry};
use lookbook_contracts::presets::PresetCatalog;
use tracing::{info, warn};

use crate::orchestrator::{GenerationOrchestrator, GenerationRequest};
use crate::outcome::GenerationResult;

/// One photo-shoot session: the two input slots, the results gallery and
/// the preset catalog, driving an orchestrator.
pub struct Studio {
    model_image: Option<ImageAsset>,
    product_image: Option<ImageAsset>,
    gallery: Gallery,
    presets: PresetCatalog,
    orchestrator: GenerationOrchestrator,
}

impl Studio {
    pub fn new(orchestrator: GenerationOrchestrator) -> Self {
        Self::with_catalog(orchestrator, PresetCatalog::default())
    }

    pub fn with_catalog(orchestrator: GenerationOrchestrator, presets: PresetCatalog) -> Self {
        Self {
            model_image: None,
            product_image: None,
            gallery: Gallery::new(),
            presets,
            orchestrator,
        }
    }

    pub fn set_model_image(&mut self, image: ImageAsset) {
        self.model_image = Some(image);
    }

    pub fn clear_model_image(&mut self) {
        self.model_image = None;
    }

    pub fn set_product_image(&mut self, image: ImageAsset) {
        self.product_image = Some(image);
    }

    pub fn clear_product_image(&mut self) {
        self.product_image = None;
    }

    pub fn model_image(&self) -> Option<&ImageAsset> {
        self.model_image.as_ref()
    }

    pub fn product_image(&self) -> Option<&ImageAsset> {
        self.product_image.as_ref()
    }

    pub fn presets(&self) -> &PresetCatalog {
        &self.presets
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn orchestrator(&self) -> &GenerationOrchestrator {
        &self.orchestrator
    }

    pub fn generate_preset(&mut self, preset_id: &str) -> Result<GenerationResult> {
        let Some(preset) = self.presets.get(preset_id) else {
            bail!("unknown preset id: {}", preset_id.trim());
        };
        let prompt = preset.prompt.clone();
        info!(preset = %preset.id, label = %preset.label, "generating from preset");
        Ok(self.generate_style(&prompt))
    }

    /// The gallery only changes on success; the stored entry keeps the style
    /// text that was sent.
    pub fn generate_style(&mut self, style_text: &str) -> GenerationResult {
        let request = GenerationRequest::new(
            self.model_image.clone(),
            self.product_image.clone(),
            style_text,
        );
        let result = self.orchestrator.run_generation(request, self.gallery.len());
        if let GenerationResult::Success { image } = &result {
            let entry = GalleryEntry::new(image.clone(), style_text);
            match self.gallery.push(entry) {
                Ok(entry) => {
                    let entry_id = entry.id.clone();
                    self.orchestrator.record(SessionEvent::GalleryEntryAdded {
                        entry_id,
                        gallery_count: self.gallery.len(),
                    });
                }
                Err(err) => warn!("generated image dropped: {err:#}"),
            }
        }
        result
    }

    pub fn remove(&mut self, id: &str) -> Option<GalleryEntry> {
        let removed = self.gallery.remove(id)?;
        self.orchestrator.record(SessionEvent::GalleryEntryRemoved {
            entry_id: removed.id.clone(),
            gallery_count: self.gallery.len(),
        });
        Some(removed)
    }

    pub fn clear_gallery(&mut self) {
        if self.gallery.is_empty() {
            return;
        }
        self.gallery.clear();
        self.orchestrator.record(SessionEvent::GalleryCleared);
    }
}
