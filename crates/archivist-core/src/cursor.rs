//! Persistent per-conversation watermarks.
//!
//! The whole document is rewritten on every committed mutation. Mutations are
//! applied to a copy first and only replace the in-memory document after the
//! copy has been persisted, so a failed save never advances a watermark.

use crate::error::CursorError;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Watermarks for a single conversation.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CursorState {
    /// Highest timestamp observed.
    #[serde(default)]
    pub last_seen_ts: i64,
    /// Watermark consumed by the last incremental summary.
    #[serde(default)]
    pub last_summary_ts: i64,
    /// Watermark for catch-up: the last restart or the last catch-up.
    #[serde(default)]
    pub boot_marker_ts: i64,
}

impl CursorState {
    /// Clamp consumed watermarks so they never exceed `last_seen_ts`.
    fn clamped(self) -> Self {
        Self {
            last_summary_ts: self.last_summary_ts.min(self.last_seen_ts),
            boot_marker_ts: self.boot_marker_ts.min(self.last_seen_ts),
            ..self
        }
    }
}

/// Global state document persisted between runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CursorDocument {
    /// Timestamp of the most recent process start.
    #[serde(default)]
    pub boot_ts: i64,
    /// Watermarks keyed by conversation id.
    #[serde(default)]
    pub conversations: BTreeMap<String, CursorState>,
}

/// File-backed cursor store.
#[derive(Debug)]
pub struct CursorStore {
    path: PathBuf,
    document: CursorDocument,
}

impl CursorStore {
    /// Load the state document and reset every boot marker to "now".
    pub fn open(path: impl AsRef<Path>, now: i64) -> Result<Self, CursorError> {
        let mut store = Self::load(path)?;
        let mut next = store.document.clone();
        next.boot_ts = now;
        for state in next.conversations.values_mut() {
            state.boot_marker_ts = state.last_seen_ts;
        }
        store.commit(next)?;
        info!(
            "cursor store opened (path={}, conversations={}, boot_ts={})",
            store.path.display(),
            store.document.conversations.len(),
            now
        );
        Ok(store)
    }

    /// Load the state document without touching boot markers.
    ///
    /// A missing or unparsable document yields a fresh empty state.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CursorError> {
        let path = path.as_ref().to_path_buf();
        let document = match fs::read(&path) {
            Ok(raw) => match serde_json::from_slice::<CursorDocument>(&raw) {
                Ok(mut document) => {
                    for state in document.conversations.values_mut() {
                        *state = state.clamped();
                    }
                    document
                }
                Err(err) => {
                    warn!(
                        "corrupt cursor state ignored, starting fresh (path={}): {err}",
                        path.display()
                    );
                    CursorDocument::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => CursorDocument::default(),
            Err(err) => return Err(CursorError::Io(err)),
        };
        Ok(Self { path, document })
    }

    /// Path of the state document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Full in-memory document.
    pub fn document(&self) -> &CursorDocument {
        &self.document
    }

    /// Watermarks for a conversation, zeroed if it was never observed.
    pub fn get(&self, conversation_id: &str) -> CursorState {
        self.document
            .conversations
            .get(conversation_id)
            .copied()
            .unwrap_or_default()
    }

    /// Record an inbound timestamp: `last_seen_ts` keeps the maximum.
    pub fn observe(&mut self, conversation_id: &str, ts: i64) -> Result<CursorState, CursorError> {
        self.update(conversation_id, |state| {
            state.last_seen_ts = state.last_seen_ts.max(ts);
        })
    }

    /// Move the summary watermark up to `seen`, never past `last_seen_ts`.
    pub fn advance_summary(
        &mut self,
        conversation_id: &str,
        seen: i64,
    ) -> Result<CursorState, CursorError> {
        self.update(conversation_id, |state| {
            state.last_summary_ts = state.last_summary_ts.max(seen.min(state.last_seen_ts));
        })
    }

    /// Move the catch-up marker up to `seen`, never past `last_seen_ts`.
    pub fn advance_catchup(
        &mut self,
        conversation_id: &str,
        seen: i64,
    ) -> Result<CursorState, CursorError> {
        self.update(conversation_id, |state| {
            state.boot_marker_ts = state.boot_marker_ts.max(seen.min(state.last_seen_ts));
        })
    }

    /// Apply a mutation to one conversation and persist it if anything changed.
    fn update(
        &mut self,
        conversation_id: &str,
        mutate: impl FnOnce(&mut CursorState),
    ) -> Result<CursorState, CursorError> {
        let current = self.document.conversations.get(conversation_id).copied();
        let mut state = current.unwrap_or_default();
        mutate(&mut state);
        if current == Some(state) || (current.is_none() && state == CursorState::default()) {
            return Ok(state);
        }
        let mut next = self.document.clone();
        next.conversations.insert(conversation_id.to_string(), state);
        self.commit(next)?;
        debug!(
            "cursor updated (conversation_id={}, last_seen_ts={}, last_summary_ts={}, boot_marker_ts={})",
            conversation_id, state.last_seen_ts, state.last_summary_ts, state.boot_marker_ts
        );
        Ok(state)
    }

    /// Persist a document, then make it the in-memory state.
    fn commit(&mut self, next: CursorDocument) -> Result<(), CursorError> {
        write_document(&self.path, &next)?;
        self.document = next;
        Ok(())
    }
}

/// Rewrite the state document through a temporary file.
fn write_document(path: &Path, document: &CursorDocument) -> Result<(), CursorError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    let serialized = serde_json::to_string_pretty(document)?;
    let temp_path = path.with_extension("json.tmp");
    {
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&temp_path)?;
        file.write_all(serialized.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CursorDocument, CursorState, CursorStore};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_document_starts_fresh() {
        let temp = tempdir().expect("tempdir");
        let store = CursorStore::load(temp.path().join("state.json")).expect("load");
        assert_eq!(store.document(), &CursorDocument::default());
        assert_eq!(store.get("c1"), CursorState::default());
    }

    #[test]
    fn corrupt_document_starts_fresh() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("state.json");
        std::fs::write(&path, "{ \"conversations\": ").expect("write");
        let store = CursorStore::open(&path, 50).expect("open");
        assert_eq!(store.document().conversations.len(), 0);
        assert_eq!(store.document().boot_ts, 50);
    }

    #[test]
    fn observe_keeps_maximum_and_persists() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("state.json");
        let mut store = CursorStore::open(&path, 1).expect("open");
        store.observe("c1", 10).expect("observe");
        store.observe("c1", 7).expect("observe late");
        assert_eq!(store.get("c1").last_seen_ts, 10);

        let reloaded = CursorStore::load(&path).expect("reload");
        assert_eq!(reloaded.get("c1").last_seen_ts, 10);
    }

    #[test]
    fn watermarks_never_pass_last_seen_or_decrease() {
        let temp = tempdir().expect("tempdir");
        let mut store = CursorStore::open(temp.path().join("state.json"), 1).expect("open");
        store.observe("c1", 10).expect("observe");

        let state = store.advance_summary("c1", 25).expect("advance");
        assert_eq!(state.last_summary_ts, 10);
        let state = store.advance_summary("c1", 3).expect("advance back");
        assert_eq!(state.last_summary_ts, 10);

        let state = store.advance_catchup("c1", 8).expect("catchup");
        assert_eq!(state.boot_marker_ts, 8);
        let state = store.advance_catchup("c1", 2).expect("catchup back");
        assert_eq!(state.boot_marker_ts, 8);
    }

    #[test]
    fn open_resets_boot_markers_to_last_seen() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("state.json");
        {
            let mut store = CursorStore::open(&path, 1).expect("open");
            store.observe("c1", 40).expect("observe");
            store.advance_summary("c1", 20).expect("summary");
        }
        let store = CursorStore::open(&path, 99).expect("reopen");
        assert_eq!(
            store.get("c1"),
            CursorState {
                last_seen_ts: 40,
                last_summary_ts: 20,
                boot_marker_ts: 40,
            }
        );
        assert_eq!(store.document().boot_ts, 99);
    }

    #[test]
    fn out_of_range_watermarks_are_clamped_on_load() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("state.json");
        std::fs::write(
            &path,
            r#"{"bootTs":1,"conversations":{"c1":{"lastSeenTs":5,"lastSummaryTs":9,"bootMarkerTs":7}}}"#,
        )
        .expect("write");
        let store = CursorStore::load(&path).expect("load");
        assert_eq!(store.get("c1").last_summary_ts, 5);
        assert_eq!(store.get("c1").boot_marker_ts, 5);
    }

    #[test]
    fn failed_save_leaves_memory_untouched() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path().join("state");
        std::fs::create_dir_all(&dir).expect("dir");
        let mut store = CursorStore::load(dir.join("state.json")).expect("load");
        std::fs::remove_dir(&dir).expect("remove dir");
        std::fs::write(&dir, "file, not a directory").expect("block");

        assert!(store.observe("c1", 10).is_err());
        assert_eq!(store.get("c1"), CursorState::default());
    }
}
