use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Step of one generation. A run starts in `Idle`, passes through the
/// working steps and returns to `Idle` after its terminal step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationPhase {
    Idle,
    Validating,
    Rejected,
    Resizing,
    Composing,
    Requesting,
    Succeeded,
    Refused,
    Failed,
}

impl GenerationPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            GenerationPhase::Idle => "idle",
            GenerationPhase::Validating => "validating",
            GenerationPhase::Rejected => "rejected",
            GenerationPhase::Resizing => "resizing",
            GenerationPhase::Composing => "composing",
            GenerationPhase::Requesting => "requesting",
            GenerationPhase::Succeeded => "succeeded",
            GenerationPhase::Refused => "refused",
            GenerationPhase::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            GenerationPhase::Rejected
                | GenerationPhase::Succeeded
                | GenerationPhase::Refused
                | GenerationPhase::Failed
        )
    }
}

impl fmt::Display for GenerationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a studio session records. Serialized with its kind under
/// `type`; phase events use the phase name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    SessionStarted {
        image_model: String,
        max_dimension: u32,
        out_dir: String,
    },
    Idle,
    Validating,
    Rejected {
        failure_kind: String,
        message: String,
    },
    Resizing {
        max_dimension: u32,
        model_bytes: usize,
        product_bytes: usize,
    },
    Composing {
        style_text: String,
    },
    Requesting {
        backend: String,
    },
    Succeeded,
    Refused {
        message: String,
    },
    Failed {
        failure_kind: String,
        message: String,
    },
    GalleryEntryAdded {
        entry_id: String,
        gallery_count: usize,
    },
    GalleryEntryRemoved {
        entry_id: String,
        gallery_count: usize,
    },
    GalleryCleared,
}

impl SessionEvent {
    /// The generation step this event marks, if it is a phase event.
    pub fn phase(&self) -> Option<GenerationPhase> {
        let phase = match self {
            SessionEvent::Idle => GenerationPhase::Idle,
            SessionEvent::Validating => GenerationPhase::Validating,
            SessionEvent::Rejected { .. } => GenerationPhase::Rejected,
            SessionEvent::Resizing { .. } => GenerationPhase::Resizing,
            SessionEvent::Composing { .. } => GenerationPhase::Composing,
            SessionEvent::Requesting { .. } => GenerationPhase::Requesting,
            SessionEvent::Succeeded => GenerationPhase::Succeeded,
            SessionEvent::Refused { .. } => GenerationPhase::Refused,
            SessionEvent::Failed { .. } => GenerationPhase::Failed,
            SessionEvent::SessionStarted { .. }
            | SessionEvent::GalleryEntryAdded { .. }
            | SessionEvent::GalleryEntryRemoved { .. }
            | SessionEvent::GalleryCleared => return None,
        };
        Some(phase)
    }

    /// The `type` value written for this event.
    pub fn kind(&self) -> &'static str {
        if let Some(phase) = self.phase() {
            return phase.as_str();
        }
        match self {
            SessionEvent::SessionStarted { .. } => "session_started",
            SessionEvent::GalleryEntryAdded { .. } => "gallery_entry_added",
            SessionEvent::GalleryEntryRemoved { .. } => "gallery_entry_removed",
            _ => "gallery_cleared",
        }
    }
}

/// One line of `events.jsonl` read back.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub session_id: String,
    pub ts: String,
    pub event: SessionEvent,
}

/// Append-only `events.jsonl` for one studio session.
///
/// Each line is the event object plus `session_id` and `ts`. The file is
/// opened once and shared by clones; lines from concurrent writers never
/// interleave.
#[derive(Debug, Clone)]
pub struct EventWriter {
    inner: Arc<EventLog>,
}

#[derive(Debug)]
struct EventLog {
    path: PathBuf,
    session_id: String,
    file: Mutex<File>,
}

impl EventWriter {
    pub fn create(path: impl Into<PathBuf>, session_id: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed creating {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed opening event log {}", path.display()))?;
        Ok(Self {
            inner: Arc::new(EventLog {
                path,
                session_id: session_id.into(),
                file: Mutex::new(file),
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    pub fn emit(&self, event: &SessionEvent) -> Result<()> {
        let Value::Object(mut row) = serde_json::to_value(event)? else {
            bail!("event {} did not serialize to an object", event.kind());
        };
        row.insert(
            "session_id".to_string(),
            Value::String(self.inner.session_id.clone()),
        );
        row.insert("ts".to_string(), Value::String(now_utc_iso()));

        let mut line = serde_json::to_string(&row)?;
        line.push('\n');
        let mut file = self
            .inner
            .file
            .lock()
            .map_err(|_| anyhow!("event log lock poisoned"))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("failed writing {}", self.inner.path.display()))?;
        Ok(())
    }

    /// Every record written so far, in order. Lines that do not parse are
    /// skipped.
    pub fn read_all(&self) -> Result<Vec<EventRecord>> {
        let raw = match fs::read_to_string(&self.inner.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        Ok(raw.lines().filter_map(parse_record).collect())
    }

    pub fn event_types(&self) -> Result<Vec<String>> {
        Ok(self
            .read_all()?
            .iter()
            .map(|record| record.event.kind().to_string())
            .collect())
    }
}

fn parse_record(line: &str) -> Option<EventRecord> {
    let mut row: Map<String, Value> = serde_json::from_str(line).ok()?;
    let session_id = take_string(&mut row, "session_id")?;
    let ts = take_string(&mut row, "ts")?;
    let event = serde_json::from_value(Value::Object(row)).ok()?;
    Some(EventRecord {
        session_id,
        ts,
        event,
    })
}

fn take_string(row: &mut Map<String, Value>, key: &str) -> Option<String> {
    match row.remove(key)? {
        Value::String(value) => Some(value),
        _ => None,
    }
}

fn now_utc_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false)
}
