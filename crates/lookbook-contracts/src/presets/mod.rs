mod catalog;
mod category;

pub use catalog::{PresetCatalog, StylePreset};
pub use category::PresetCategory;
