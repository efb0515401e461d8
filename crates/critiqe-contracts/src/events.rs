//! Session event log. Each [`SessionEvent`] becomes one JSON line stamped
//! with the session id and a UTC timestamp.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// What the log keeps of an uploaded image. Built from the bytes, but only
/// their length survives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageSummary {
    pub filename: String,
    pub mime_type: String,
    pub size_bytes: usize,
}

impl ImageSummary {
    pub fn of(filename: &str, mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            filename: filename.to_string(),
            mime_type: mime_type.to_string(),
            size_bytes: bytes.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    SessionStarted {
        mode: String,
    },
    ImagesUploaded {
        images: Vec<ImageSummary>,
    },
    StyleSelected {
        style: String,
    },
    DraftStarted {
        platform: String,
        mood: String,
    },
    DraftCompleted {
        chars: usize,
    },
    DraftFailed {
        reason: String,
        error: String,
    },
    GenerationStarted {
        sequence: u64,
        kind: String,
        references: usize,
        aspect_ratio: String,
    },
    /// `digest` is a short hash of the result handle, never the image.
    GenerationCompleted {
        sequence: u64,
        mime_type: Option<String>,
        digest: String,
        late: bool,
    },
    GenerationFailed {
        reason: String,
        error: String,
    },
    ViewChanged {
        view: String,
    },
}

impl SessionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::SessionStarted { .. } => "session_started",
            SessionEvent::ImagesUploaded { .. } => "images_uploaded",
            SessionEvent::StyleSelected { .. } => "style_selected",
            SessionEvent::DraftStarted { .. } => "draft_started",
            SessionEvent::DraftCompleted { .. } => "draft_completed",
            SessionEvent::DraftFailed { .. } => "draft_failed",
            SessionEvent::GenerationStarted { .. } => "generation_started",
            SessionEvent::GenerationCompleted { .. } => "generation_completed",
            SessionEvent::GenerationFailed { .. } => "generation_failed",
            SessionEvent::ViewChanged { .. } => "view_changed",
        }
    }
}

#[derive(Serialize)]
struct Line<'a> {
    session_id: &'a str,
    ts: String,
    #[serde(flatten)]
    event: &'a SessionEvent,
}

/// Append-only `events.jsonl` for one session.
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
    session_id: String,
}

impl SessionLog {
    pub fn new(path: impl Into<PathBuf>, session_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            session_id: session_id.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Writes `event` as a single line and returns that line.
    pub fn record(&self, event: &SessionEvent) -> anyhow::Result<String> {
        let mut line = serde_json::to_string(&Line {
            session_id: &self.session_id,
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            event,
        })
        .with_context(|| format!("failed to encode {} event", event.kind()))?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        line.push('\n');
        file.write_all(line.as_bytes())?;
        line.pop();
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::DateTime;
    use serde_json::Value;

    use super::*;

    fn rows(path: &Path) -> anyhow::Result<Vec<Value>> {
        fs::read_to_string(path)?
            .lines()
            .map(|line| serde_json::from_str(line).map_err(anyhow::Error::from))
            .collect()
    }

    #[test]
    fn record_writes_tagged_line_with_session_and_timestamp() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("events.jsonl");
        let log = SessionLog::new(&path, "session-123");

        let line = log.record(&SessionEvent::StyleSelected {
            style: "pop-art".to_string(),
        })?;

        let rows = rows(&path)?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], serde_json::from_str::<Value>(&line)?);
        assert_eq!(rows[0]["type"], "style_selected");
        assert_eq!(rows[0]["session_id"], "session-123");
        assert_eq!(rows[0]["style"], "pop-art");
        DateTime::parse_from_rfc3339(rows[0]["ts"].as_str().unwrap_or(""))?;
        Ok(())
    }

    #[test]
    fn uploads_are_logged_as_sizes_only() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("events.jsonl");
        let log = SessionLog::new(&path, "session-123");

        log.record(&SessionEvent::ImagesUploaded {
            images: vec![ImageSummary::of("me.jpg", "image/jpeg", b"raw-pixel-data")],
        })?;

        let raw = fs::read_to_string(&path)?;
        assert!(!raw.contains("raw-pixel-data"));
        let rows = rows(&path)?;
        assert_eq!(rows[0]["images"][0]["filename"], "me.jpg");
        assert_eq!(rows[0]["images"][0]["size_bytes"], 14);
        Ok(())
    }

    #[test]
    fn record_creates_parent_dirs_and_appends() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("nested").join("events.jsonl");
        let log = SessionLog::new(&path, "session-123");

        let started = SessionEvent::GenerationStarted {
            sequence: 1,
            kind: "generate".to_string(),
            references: 1,
            aspect_ratio: "1:1".to_string(),
        };
        let failed = SessionEvent::DraftFailed {
            reason: "Failed to generate prompt idea. Please try again.".to_string(),
            error: "model returned no text".to_string(),
        };
        log.record(&started)?;
        log.record(&failed)?;

        let types: Vec<String> = rows(&path)?
            .iter()
            .filter_map(|row| row["type"].as_str().map(str::to_string))
            .collect();
        assert_eq!(types, vec![started.kind(), failed.kind()]);
        Ok(())
    }
}
