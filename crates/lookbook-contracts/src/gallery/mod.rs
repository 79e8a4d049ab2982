mod entries;
mod manifest;
mod slot;

pub use entries::{Gallery, GalleryEntry, GALLERY_CAPACITY};
pub use manifest::{write_manifest, ManifestRow};
pub use slot::{InFlightGuard, InFlightSlot};
