//! Incremental digest engine for archived conversations.
//!
//! This crate owns the cursor store, the heuristic classifier, the template
//! renderer and the orchestrator that ties them to a message archive.

pub mod classify;
pub mod clock;
pub mod cursor;
pub mod error;
pub mod extract;
pub mod orchestrator;
pub mod random;
pub mod render;
pub mod types;

pub use classify::{Classifier, DecisionStatus, QuestionOutcome, Signals};
pub use clock::{Clock, SystemClock};
pub use cursor::{CursorDocument, CursorState, CursorStore};
pub use error::{CursorError, DigestError};
pub use extract::{ExtractionKind, Extractor};
/// Orchestrator facade used by chat transports.
pub use orchestrator::{APOLOGY, DigestOrchestrator, DigestOrchestratorBuilder};
pub use random::{IndexSource, SeededSource, ThreadRngSource};
pub use render::{
    DigestKind, EMPTY_WINDOW, Renderer, TemplateMemory, TemplatePool, ViewKind, pick_index,
    spell_small,
};
pub use types::{DigestRequest, InboundMessage};
