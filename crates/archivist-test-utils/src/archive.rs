use archivist_archive::{ArchiveError, MessageArchive, MessageRecord};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Archive kept entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryArchive {
    logs: Mutex<HashMap<String, Vec<MessageRecord>>>,
}

impl InMemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record stored for a conversation, in append order.
    pub fn records(&self, conversation_id: &str) -> Vec<MessageRecord> {
        self.logs
            .lock()
            .get(conversation_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl MessageArchive for InMemoryArchive {
    async fn append(&self, record: &MessageRecord) -> Result<(), ArchiveError> {
        self.logs
            .lock()
            .entry(record.conversation_id.clone())
            .or_default()
            .push(record.clone());
        Ok(())
    }

    async fn read_since(
        &self,
        conversation_id: &str,
        since_ts: i64,
        limit: usize,
        include_commands: bool,
    ) -> Result<Vec<MessageRecord>, ArchiveError> {
        let logs = self.logs.lock();
        let mut window = VecDeque::new();
        for record in logs.get(conversation_id).into_iter().flatten() {
            if record.timestamp <= since_ts || (!include_commands && record.is_command) {
                continue;
            }
            window.push_back(record.clone());
            if window.len() > limit {
                window.pop_front();
            }
        }
        Ok(window.into_iter().collect())
    }
}

/// Archive whose every operation fails with an I/O error.
#[derive(Debug, Default)]
pub struct FailingArchive {
    attempts: AtomicUsize,
}

impl FailingArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of operations attempted against this archive.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn fail(&self) -> ArchiveError {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        ArchiveError::Io(std::io::Error::other("archive offline"))
    }
}

#[async_trait]
impl MessageArchive for FailingArchive {
    async fn append(&self, _record: &MessageRecord) -> Result<(), ArchiveError> {
        Err(self.fail())
    }

    async fn read_since(
        &self,
        _conversation_id: &str,
        _since_ts: i64,
        _limit: usize,
        _include_commands: bool,
    ) -> Result<Vec<MessageRecord>, ArchiveError> {
        Err(self.fail())
    }
}
