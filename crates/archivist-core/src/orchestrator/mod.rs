//! Digest orchestration: ties archive, cursors, classifier and renderer
//! together for each request.

mod policy;

use crate::classify::{Classifier, Signals};
use crate::clock::{Clock, SystemClock};
use crate::cursor::{CursorState, CursorStore};
use crate::error::DigestError;
use crate::extract::{ExtractionKind, Extractor};
use crate::random::{IndexSource, ThreadRngSource};
use crate::render::{DigestKind, Renderer, TemplateMemory, ViewKind};
use crate::types::{DigestRequest, InboundMessage};
use archivist_archive::{FileArchive, MaskingRedactor, MessageArchive, MessageRecord, Redactor};
use archivist_config::{ArchiveConfig, ArchivistConfig};
use log::{debug, error, info};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use policy::redaction_policy_from_config;

/// Reply sent in place of a digest when storage fails.
pub const APOLOGY: &str = "Archivist regrets: the records are temporarily unavailable.";

/// Per-request glue over the archive, cursor store and renderers.
pub struct DigestOrchestrator {
    config: Arc<ArchivistConfig>,
    archive: Arc<dyn MessageArchive>,
    cursors: Mutex<CursorStore>,
    templates: Mutex<HashMap<String, TemplateMemory>>,
    index_source: Mutex<Box<dyn IndexSource>>,
    redactor: Arc<dyn Redactor>,
    classifier: Classifier,
    renderer: Renderer,
    extractor: Extractor,
}

impl DigestOrchestrator {
    /// Start building an orchestrator; unset collaborators default from `config`.
    pub fn builder(config: ArchivistConfig) -> DigestOrchestratorBuilder {
        DigestOrchestratorBuilder::new(config)
    }

    pub fn config(&self) -> &ArchivistConfig {
        &self.config
    }

    /// Archive an inbound message and advance `last_seen_ts`.
    ///
    /// Returns `false` when the text is blank and nothing was stored.
    pub async fn record_inbound(&self, message: InboundMessage) -> Result<bool, DigestError> {
        if message.text.trim().is_empty() {
            debug!(
                "blank message dropped (conversation_id={}, timestamp={})",
                message.conversation_id, message.timestamp
            );
            return Ok(false);
        }
        let record = message.into_record();
        self.archive
            .append(&record)
            .await
            .map_err(DigestError::storage)?;
        self.cursors
            .lock()
            .observe(&record.conversation_id, record.timestamp)
            .map_err(DigestError::storage)?;
        debug!(
            "message recorded (conversation_id={}, timestamp={}, is_command={})",
            record.conversation_id, record.timestamp, record.is_command
        );
        Ok(true)
    }

    /// Digest of everything since the previous summary.
    pub async fn summary(&self, conversation_id: &str) -> Result<String, DigestError> {
        self.incremental(conversation_id, DigestKind::Summary).await
    }

    /// Digest of everything since the later of the last restart and the last
    /// catch-up.
    pub async fn catchup(&self, conversation_id: &str) -> Result<String, DigestError> {
        self.incremental(conversation_id, DigestKind::Catchup).await
    }

    /// Observe or silence view over the most recent messages. Cursors are not
    /// moved.
    pub async fn recent_view(
        &self,
        conversation_id: &str,
        kind: ViewKind,
        limit: Option<usize>,
    ) -> Result<String, DigestError> {
        let window = limit.unwrap_or(match kind {
            ViewKind::Observe => self.config.windows.observe,
            ViewKind::Silence => self.config.windows.silence,
        });
        let records = self
            .archive
            .read_recent(conversation_id, window, false)
            .await
            .map_err(DigestError::storage)?;
        let signals = self.classify(&records);
        Ok(self.renderer.render_view(&signals, kind))
    }

    pub async fn loose_ends(&self, conversation_id: &str) -> Result<String, DigestError> {
        self.extraction(conversation_id, ExtractionKind::LooseEnds)
            .await
    }

    pub async fn decisions(&self, conversation_id: &str) -> Result<String, DigestError> {
        self.extraction(conversation_id, ExtractionKind::Decisions)
            .await
    }

    /// Run a request and always produce reply text; failures become
    /// [`APOLOGY`].
    pub async fn handle(&self, conversation_id: &str, request: DigestRequest) -> String {
        let result = match request {
            DigestRequest::Summary => self.summary(conversation_id).await,
            DigestRequest::Catchup => self.catchup(conversation_id).await,
            DigestRequest::View { kind, limit } => {
                self.recent_view(conversation_id, kind, limit).await
            }
            DigestRequest::LooseEnds => self.loose_ends(conversation_id).await,
            DigestRequest::Decisions => self.decisions(conversation_id).await,
        };
        match result {
            Ok(text) => text,
            Err(err) => {
                error!(
                    "digest request failed (conversation_id={}, request={}): {err}",
                    conversation_id,
                    request.name()
                );
                APOLOGY.to_string()
            }
        }
    }

    /// Current watermarks for a conversation.
    pub fn cursor(&self, conversation_id: &str) -> CursorState {
        self.cursors.lock().get(conversation_id)
    }

    async fn incremental(
        &self,
        conversation_id: &str,
        kind: DigestKind,
    ) -> Result<String, DigestError> {
        let snapshot = self.cursor(conversation_id);
        let (since, window) = match kind {
            DigestKind::Summary => (snapshot.last_summary_ts, self.config.windows.summary),
            DigestKind::Catchup => (snapshot.boot_marker_ts, self.config.windows.catchup),
        };
        let records = self
            .archive
            .read_since(conversation_id, since, window, false)
            .await
            .map_err(DigestError::storage)?;
        let signals = self.classify(&records);

        let mut memory = self
            .templates
            .lock()
            .get(conversation_id)
            .cloned()
            .unwrap_or_default();
        let text = {
            let mut source = self.index_source.lock();
            self.renderer
                .render(&signals, &mut memory, kind, &mut **source)
        };

        {
            let mut cursors = self.cursors.lock();
            let advanced = match kind {
                DigestKind::Summary => {
                    cursors.advance_summary(conversation_id, snapshot.last_seen_ts)
                }
                DigestKind::Catchup => {
                    cursors.advance_catchup(conversation_id, snapshot.last_seen_ts)
                }
            };
            advanced.map_err(DigestError::storage)?;
        }
        self.templates
            .lock()
            .insert(conversation_id.to_string(), memory);

        info!(
            "digest rendered (conversation_id={}, kind={:?}, since={}, volume={}, watermark={})",
            conversation_id, kind, since, signals.volume, snapshot.last_seen_ts
        );
        Ok(text)
    }

    async fn extraction(
        &self,
        conversation_id: &str,
        kind: ExtractionKind,
    ) -> Result<String, DigestError> {
        let records = self
            .archive
            .read_recent(conversation_id, self.config.windows.extraction, false)
            .await
            .map_err(DigestError::storage)?;
        let texts = self.redacted_texts(&records);
        debug!(
            "extraction digest (conversation_id={}, kind={:?}, messages={})",
            conversation_id,
            kind,
            texts.len()
        );
        Ok(self.extractor.render(&texts, kind))
    }

    fn classify(&self, records: &[MessageRecord]) -> Signals {
        self.classifier.classify(&self.redacted_texts(records))
    }

    fn redacted_texts(&self, records: &[MessageRecord]) -> Vec<String> {
        records
            .iter()
            .filter(|record| !record.is_command)
            .map(|record| self.redactor.redact(&record.text))
            .collect()
    }
}

/// Builder for [`DigestOrchestrator`].
pub struct DigestOrchestratorBuilder {
    config: ArchivistConfig,
    archive: Option<Arc<dyn MessageArchive>>,
    cursor_store: Option<CursorStore>,
    redactor: Option<Arc<dyn Redactor>>,
    index_source: Option<Box<dyn IndexSource>>,
    clock: Option<Arc<dyn Clock>>,
}

impl DigestOrchestratorBuilder {
    fn new(config: ArchivistConfig) -> Self {
        Self {
            config,
            archive: None,
            cursor_store: None,
            redactor: None,
            index_source: None,
            clock: None,
        }
    }

    /// Use a custom archive instead of the file archive at `archive.path`.
    pub fn archive(mut self, archive: Arc<dyn MessageArchive>) -> Self {
        self.archive = Some(archive);
        self
    }

    /// Use an already opened cursor store instead of opening `state.path`.
    pub fn cursor_store(mut self, cursor_store: CursorStore) -> Self {
        self.cursor_store = Some(cursor_store);
        self
    }

    pub fn redactor(mut self, redactor: Arc<dyn Redactor>) -> Self {
        self.redactor = Some(redactor);
        self
    }

    pub fn index_source(mut self, index_source: Box<dyn IndexSource>) -> Self {
        self.index_source = Some(index_source);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<DigestOrchestrator, DigestError> {
        let config = self.config;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let archive = match self.archive {
            Some(archive) => archive,
            None => build_default_archive(&config.archive)?,
        };
        let cursor_store = match self.cursor_store {
            Some(store) => store,
            None => CursorStore::open(&config.state.path, clock.now())
                .map_err(DigestError::storage)?,
        };
        let redactor = match self.redactor {
            Some(redactor) => redactor,
            None => build_default_redactor(&config)?,
        };
        let index_source = self
            .index_source
            .unwrap_or_else(|| Box::new(ThreadRngSource));
        let classifier = Classifier::new(
            config.redaction.link_marker.clone(),
            config.render.quote_max_chars,
        )?;
        let renderer = Renderer::new(&config.render);
        let extractor = Extractor::new(&config.render)?;
        info!(
            "digest orchestrator ready (state_path={}, conversations={})",
            cursor_store.path().display(),
            cursor_store.document().conversations.len()
        );
        Ok(DigestOrchestrator {
            config: Arc::new(config),
            archive,
            cursors: Mutex::new(cursor_store),
            templates: Mutex::new(HashMap::new()),
            index_source: Mutex::new(index_source),
            redactor,
            classifier,
            renderer,
            extractor,
        })
    }
}

fn build_default_archive(config: &ArchiveConfig) -> Result<Arc<dyn MessageArchive>, DigestError> {
    debug!("opening file archive (path={})", config.path);
    let archive = FileArchive::new(&config.path).map_err(DigestError::storage)?;
    Ok(Arc::new(archive))
}

fn build_default_redactor(config: &ArchivistConfig) -> Result<Arc<dyn Redactor>, DigestError> {
    let policy = redaction_policy_from_config(&config.redaction);
    let redactor =
        MaskingRedactor::new(policy).map_err(|err| DigestError::Setup(err.to_string()))?;
    Ok(Arc::new(redactor))
}
