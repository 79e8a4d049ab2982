use std::path::Path;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::entries::GalleryEntry;

/// One exported gallery slot as recorded in `gallery.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestRow {
    pub slot: u64,
    pub id: String,
    pub file: String,
    pub mime_type: String,
    pub style_text: String,
    pub created_at: String,
}

impl ManifestRow {
    pub fn from_entry(slot: u64, entry: &GalleryEntry, file: impl Into<String>) -> Self {
        Self {
            slot,
            id: entry.id.clone(),
            file: file.into(),
            mime_type: entry.image.mime_type().to_string(),
            style_text: entry.style_text.clone(),
            created_at: entry
                .created_at
                .to_rfc3339_opts(SecondsFormat::Micros, false),
        }
    }
}

pub fn write_manifest(
    path: &Path,
    session_id: &str,
    rows: &[ManifestRow],
    extra: Option<&Map<String, Value>>,
) -> anyhow::Result<()> {
    let mut payload = Map::new();
    payload.insert(
        "session_id".to_string(),
        Value::String(session_id.to_string()),
    );
    payload.insert(
        "total_entries".to_string(),
        Value::Number((rows.len() as u64).into()),
    );
    payload.insert("entries".to_string(), serde_json::to_value(rows)?);
    payload.insert(
        "exported_at".to_string(),
        Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)),
    );
    if let Some(extra) = extra {
        for (key, value) in extra {
            payload.insert(key.clone(), value.clone());
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(&Value::Object(payload))?)?;
    Ok(())
}
