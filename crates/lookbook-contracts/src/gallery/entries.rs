use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::assets::ImageAsset;

pub const GALLERY_CAPACITY: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct GalleryEntry {
    pub id: String,
    pub image: ImageAsset,
    pub style_text: String,
    pub created_at: DateTime<Utc>,
}

impl GalleryEntry {
    pub fn new(image: ImageAsset, style_text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            image,
            style_text: style_text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Ordered result slots with a hard capacity.
///
/// `push` refuses once the gallery is full instead of evicting; callers free a
/// slot with `remove`.
#[derive(Debug, Clone)]
pub struct Gallery {
    entries: Vec<GalleryEntry>,
    capacity: usize,
}

impl Default for Gallery {
    fn default() -> Self {
        Self::new()
    }
}

impl Gallery {
    pub fn new() -> Self {
        Self::with_capacity(GALLERY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.entries.len())
    }

    pub fn entries(&self) -> &[GalleryEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&GalleryEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    pub fn push(&mut self, entry: GalleryEntry) -> Result<&GalleryEntry> {
        if self.is_full() {
            bail!(
                "Maximum of {} images allowed. Please clear a slot.",
                self.capacity
            );
        }
        self.entries.push(entry);
        let last = self.entries.len() - 1;
        Ok(&self.entries[last])
    }

    /// Removing an id that is not present is a no-op.
    pub fn remove(&mut self, id: &str) -> Option<GalleryEntry> {
        let idx = self.entries.iter().position(|entry| entry.id == id)?;
        Some(self.entries.remove(idx))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
