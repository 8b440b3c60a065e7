//! Archive implementations: the trait and the JSONL file-backed log.

use crate::error::ArchiveError;
use crate::model::MessageRecord;
use async_trait::async_trait;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Bytes read per step when scanning a log backwards.
const TAIL_CHUNK_BYTES: usize = 8 * 1024;

#[async_trait]
/// Append-only message log abstraction used by the digest orchestrator.
pub trait MessageArchive: Send + Sync {
    /// Durably append a record to its conversation's log.
    async fn append(&self, record: &MessageRecord) -> Result<(), ArchiveError>;

    /// Records with `timestamp > since_ts`, in append order, keeping the most
    /// recent `limit` after command filtering.
    async fn read_since(
        &self,
        conversation_id: &str,
        since_ts: i64,
        limit: usize,
        include_commands: bool,
    ) -> Result<Vec<MessageRecord>, ArchiveError>;

    /// The last `limit` matching records, in append order.
    async fn read_recent(
        &self,
        conversation_id: &str,
        limit: usize,
        include_commands: bool,
    ) -> Result<Vec<MessageRecord>, ArchiveError> {
        self.read_since(conversation_id, i64::MIN, limit, include_commands)
            .await
    }
}

/// File-backed archive storing one JSONL log per conversation.
#[derive(Debug)]
pub struct FileArchive {
    /// Root directory for conversation logs.
    root: PathBuf,
    /// Per-conversation locks serializing appends.
    write_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl FileArchive {
    /// Create a new file-backed archive under the given root.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        info!("initialized file archive (root={})", root.display());
        Ok(Self {
            root,
            write_locks: Mutex::new(HashMap::new()),
        })
    }

    /// Root directory holding the logs.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to a conversation's JSONL log.
    pub fn log_path(&self, conversation_id: &str) -> PathBuf {
        self.root
            .join(format!("{}.jsonl", encode_file_stem(conversation_id)))
    }

    /// Lock guarding appends for one conversation.
    fn write_lock(&self, conversation_id: &str) -> Arc<Mutex<()>> {
        self.write_locks
            .lock()
            .entry(conversation_id.to_string())
            .or_default()
            .clone()
    }

    /// Open a log for reading, mapping a missing file to `None`.
    fn open_log(&self, conversation_id: &str) -> Result<Option<File>, ArchiveError> {
        match File::open(self.log_path(conversation_id)) {
            Ok(file) => Ok(Some(file)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ArchiveError::Io(err)),
        }
    }

    /// Forward scan keeping the most recent `limit` matches.
    fn scan_since(
        &self,
        conversation_id: &str,
        since_ts: i64,
        limit: usize,
        include_commands: bool,
    ) -> Result<Vec<MessageRecord>, ArchiveError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let Some(file) = self.open_log(conversation_id)? else {
            return Ok(Vec::new());
        };
        let mut window = VecDeque::with_capacity(limit.min(1024));
        for line in BufReader::new(file).split(b'\n') {
            let line = line?;
            let Some(record) = parse_line(conversation_id, &line) else {
                continue;
            };
            if record.timestamp <= since_ts || (!include_commands && record.is_command) {
                continue;
            }
            window.push_back(record);
            if window.len() > limit {
                window.pop_front();
            }
        }
        Ok(window.into())
    }

    /// Backward scan reading only as much of the file tail as needed.
    fn scan_tail(
        &self,
        conversation_id: &str,
        limit: usize,
        include_commands: bool,
    ) -> Result<Vec<MessageRecord>, ArchiveError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let Some(mut file) = self.open_log(conversation_id)? else {
            return Ok(Vec::new());
        };
        let mut pos = file.seek(SeekFrom::End(0))?;
        let mut buf = vec![0u8; TAIL_CHUNK_BYTES];
        // Bytes of the line that straddles the boundary of the region read so far.
        let mut carry: Vec<u8> = Vec::new();
        let mut newest_first = Vec::new();

        while pos > 0 && newest_first.len() < limit {
            let step = pos.min(TAIL_CHUNK_BYTES as u64) as usize;
            pos -= step as u64;
            file.seek(SeekFrom::Start(pos))?;
            file.read_exact(&mut buf[..step])?;

            let mut region = Vec::with_capacity(step + carry.len());
            region.extend_from_slice(&buf[..step]);
            region.extend_from_slice(&carry);

            let mut segments = region.split(|byte| *byte == b'\n');
            // The first segment may continue into bytes not yet read.
            let head = if pos > 0 { segments.next() } else { None };
            let complete: Vec<&[u8]> = segments.collect();
            for segment in complete.iter().rev() {
                let Some(record) = parse_line(conversation_id, segment) else {
                    continue;
                };
                if !include_commands && record.is_command {
                    continue;
                }
                newest_first.push(record);
                if newest_first.len() == limit {
                    break;
                }
            }
            carry = head.map(<[u8]>::to_vec).unwrap_or_default();
        }

        newest_first.reverse();
        Ok(newest_first)
    }
}

#[async_trait]
impl MessageArchive for FileArchive {
    /// Append a record as one line write, synced before returning.
    async fn append(&self, record: &MessageRecord) -> Result<(), ArchiveError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        let lock = self.write_lock(&record.conversation_id);
        let _guard = lock.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path(&record.conversation_id))?;
        file.write_all(line.as_bytes())?;
        file.sync_data()?;
        debug!(
            "archived message (conversation_id={}, ts={}, text_len={}, is_command={})",
            record.conversation_id,
            record.timestamp,
            record.text.len(),
            record.is_command
        );
        Ok(())
    }

    /// Read records newer than a watermark.
    async fn read_since(
        &self,
        conversation_id: &str,
        since_ts: i64,
        limit: usize,
        include_commands: bool,
    ) -> Result<Vec<MessageRecord>, ArchiveError> {
        let records = self.scan_since(conversation_id, since_ts, limit, include_commands)?;
        debug!(
            "read archive since (conversation_id={}, since_ts={}, returned={})",
            conversation_id,
            since_ts,
            records.len()
        );
        Ok(records)
    }

    /// Read the trailing records of a log.
    async fn read_recent(
        &self,
        conversation_id: &str,
        limit: usize,
        include_commands: bool,
    ) -> Result<Vec<MessageRecord>, ArchiveError> {
        let records = self.scan_tail(conversation_id, limit, include_commands)?;
        debug!(
            "read archive tail (conversation_id={}, limit={}, returned={})",
            conversation_id,
            limit,
            records.len()
        );
        Ok(records)
    }
}

/// Parse one stored line, skipping blanks and logging corrupt records.
fn parse_line(conversation_id: &str, line: &[u8]) -> Option<MessageRecord> {
    let trimmed = line.trim_ascii();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_slice::<MessageRecord>(trimmed) {
        Ok(mut record) => {
            record.conversation_id = conversation_id.to_string();
            Some(record)
        }
        Err(err) => {
            warn!("corrupt archive record ignored (conversation_id={conversation_id}): {err}");
            None
        }
    }
}

/// Map an opaque conversation id to a file-system safe stem.
///
/// ASCII alphanumerics, `-` and `_` pass through; any other byte becomes `%XX`.
pub fn encode_file_stem(conversation_id: &str) -> String {
    let mut stem = String::with_capacity(conversation_id.len());
    for byte in conversation_id.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(byte as char);
        } else {
            stem.push_str(&format!("%{byte:02X}"));
        }
    }
    if stem.is_empty() {
        stem.push_str("%00");
    }
    stem
}

#[cfg(test)]
mod tests {
    use super::{FileArchive, MessageArchive, TAIL_CHUNK_BYTES, encode_file_stem};
    use crate::MessageRecord;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn texts(records: &[MessageRecord]) -> Vec<&str> {
        records.iter().map(|record| record.text.as_str()).collect()
    }

    async fn seed(archive: &FileArchive, conversation: &str, items: &[(i64, &str)]) {
        for (ts, text) in items {
            archive
                .append(&MessageRecord::new(conversation, *ts, *text))
                .await
                .expect("append");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_keep_lines_whole() {
        let temp = tempdir().expect("tempdir");
        let archive = Arc::new(FileArchive::new(temp.path()).expect("archive"));
        let padding = "x".repeat(5_000);

        let mut handles = Vec::new();
        for task in 0..8_usize {
            let archive = archive.clone();
            let padding = padding.clone();
            handles.push(tokio::spawn(async move {
                let own = format!("solo-{task}");
                for step in 0..100_i64 {
                    let text = format!("{task}:{step}:{padding}");
                    archive
                        .append(&MessageRecord::new("shared", step, text.as_str()))
                        .await
                        .expect("append shared");
                    archive
                        .append(&MessageRecord::new(own.as_str(), step, text.as_str()))
                        .await
                        .expect("append own");
                }
            }));
        }
        for handle in handles {
            handle.await.expect("join");
        }

        let shared = archive
            .read_since("shared", i64::MIN, usize::MAX, true)
            .await
            .expect("read shared");
        assert_eq!(shared.len(), 800);
        let mut per_task = [0_usize; 8];
        for record in &shared {
            assert!(record.text.ends_with(&padding));
            let task: usize = record.text.split(':').next().expect("prefix").parse().expect("task");
            per_task[task] += 1;
        }
        assert_eq!(per_task, [100; 8]);

        for task in 0..8 {
            let own = archive
                .read_since(&format!("solo-{task}"), i64::MIN, usize::MAX, true)
                .await
                .expect("read own");
            let steps: Vec<i64> = own.iter().map(|record| record.timestamp).collect();
            assert_eq!(steps, (0..100).collect::<Vec<_>>());
        }
    }

    #[test]
    fn file_stems_are_path_safe() {
        assert_eq!(encode_file_stem("-100123"), "-100123");
        assert_eq!(encode_file_stem("team/general"), "team%2Fgeneral");
        assert_eq!(encode_file_stem("a.b"), "a%2Eb");
        assert_eq!(encode_file_stem(""), "%00");
    }

    #[tokio::test]
    async fn append_then_read_recent_preserves_order() {
        let temp = tempdir().expect("tempdir");
        let archive = FileArchive::new(temp.path()).expect("archive");
        seed(&archive, "c1", &[(3, "first"), (1, "second"), (2, "third")]).await;

        let records = archive.read_recent("c1", 10, false).await.expect("read");
        assert_eq!(texts(&records), vec!["first", "second", "third"]);
        assert!(records.iter().all(|record| record.conversation_id == "c1"));
    }

    #[tokio::test]
    async fn missing_log_reads_empty() {
        let temp = tempdir().expect("tempdir");
        let archive = FileArchive::new(temp.path()).expect("archive");
        assert!(archive.read_recent("nobody", 5, true).await.expect("recent").is_empty());
        assert!(archive.read_since("nobody", 0, 5, true).await.expect("since").is_empty());
    }

    #[tokio::test]
    async fn read_since_filters_commands_before_limit() {
        let temp = tempdir().expect("tempdir");
        let archive = FileArchive::new(temp.path()).expect("archive");
        seed(
            &archive,
            "c1",
            &[(1, "old"), (5, "a"), (6, "b"), (7, "/summary"), (8, "c")],
        )
        .await;

        let records = archive.read_since("c1", 1, 2, false).await.expect("read");
        assert_eq!(texts(&records), vec!["b", "c"]);

        let with_commands = archive.read_since("c1", 1, 2, true).await.expect("read");
        assert_eq!(texts(&with_commands), vec!["/summary", "c"]);
    }

    #[tokio::test]
    async fn corrupt_lines_are_skipped() {
        let temp = tempdir().expect("tempdir");
        let archive = FileArchive::new(temp.path()).expect("archive");
        let items: Vec<(i64, String)> = (1..=10).map(|ts| (ts, format!("m{ts}"))).collect();
        for (ts, text) in &items[..5] {
            archive
                .append(&MessageRecord::new("c1", *ts, text.as_str()))
                .await
                .expect("append");
        }
        {
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(archive.log_path("c1"))
                .expect("open");
            file.write_all(b"{\"timestamp\": 99, \"text\": \n")
                .expect("corrupt");
            file.write_all(&[0xff, 0xfe, b'\n']).expect("bad utf8");
        }
        for (ts, text) in &items[5..] {
            archive
                .append(&MessageRecord::new("c1", *ts, text.as_str()))
                .await
                .expect("append");
        }

        let forward = archive.read_since("c1", 0, 100, true).await.expect("since");
        assert_eq!(forward.len(), 10);
        let tail = archive.read_recent("c1", 100, true).await.expect("recent");
        assert_eq!(forward, tail);
    }

    #[tokio::test]
    async fn truncated_last_line_is_skipped() {
        let temp = tempdir().expect("tempdir");
        let archive = FileArchive::new(temp.path()).expect("archive");
        seed(&archive, "c1", &[(1, "one"), (2, "two")]).await;
        {
            let mut file = std::fs::OpenOptions::new()
                .append(true)
                .open(archive.log_path("c1"))
                .expect("open");
            file.write_all(b"{\"timestamp\":3,\"te").expect("partial");
        }
        let tail = archive.read_recent("c1", 5, false).await.expect("recent");
        assert_eq!(texts(&tail), vec!["one", "two"]);
    }

    #[tokio::test]
    async fn tail_scan_spans_multiple_chunks() {
        let temp = tempdir().expect("tempdir");
        let archive = FileArchive::new(temp.path()).expect("archive");
        let filler = "x".repeat(300);
        let total = (TAIL_CHUNK_BYTES / 100) as i64;
        for ts in 1..=total {
            let text = if ts % 5 == 0 {
                format!("/cmd {ts}")
            } else {
                format!("{ts} {filler}")
            };
            archive
                .append(&MessageRecord::new("c1", ts, text))
                .await
                .expect("append");
        }

        let tail = archive.read_recent("c1", 30, false).await.expect("recent");
        let expected = archive
            .read_since("c1", 0, 30, false)
            .await
            .expect("since");
        assert_eq!(tail.len(), 30);
        assert_eq!(tail, expected);
        let newest_plain = (1..=total).rev().find(|ts| ts % 5 != 0);
        assert_eq!(tail.last().map(|record| record.timestamp), newest_plain);
    }

    #[tokio::test]
    async fn conversations_are_isolated() {
        let temp = tempdir().expect("tempdir");
        let archive = FileArchive::new(temp.path()).expect("archive");
        seed(&archive, "a", &[(1, "alpha")]).await;
        seed(&archive, "b", &[(1, "beta")]).await;
        let a = archive.read_recent("a", 10, true).await.expect("a");
        assert_eq!(texts(&a), vec!["alpha"]);
    }
}
