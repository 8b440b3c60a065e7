//! Rendering of classified windows into digest text.

use crate::classify::{DecisionStatus, Signals};
use crate::random::IndexSource;
use archivist_archive::clip_chars;
use archivist_config::RenderConfig;
use std::collections::HashMap;

/// Fixed header of views and extraction digests.
pub const HEADER: &str = "Archivist observes:";

/// Reply for a window with nothing in it.
pub const EMPTY_WINDOW: &str = "Archivist observes:\n- Nothing of note.";

const SUMMARY_OPENERS: &[&str] = &[
    "Archivist observes:",
    "Archivist records:",
    "Archivist files the following:",
    "Archivist submits a brief report:",
    "Archivist notes, without enthusiasm:",
    "Archivist provides a minimal ledger:",
];

const CATCHUP_OPENERS: &[&str] = &[
    "Activity occurred. Clarity attended intermittently.",
    "Momentum was present. Direction remained optional.",
    "Multiple threads were started. Few were finished.",
    "The room stayed active. Conclusions did not.",
    "Progress was mentioned. Evidence was modest.",
    "A discussion unfolded. A destination did not.",
    "Time was spent. Outcomes were selective.",
    "Several points were made. Most remained unclaimed.",
    "The chat remained lively. Specifics remained shy.",
    "Plans appeared briefly, then changed their names.",
    "Confidence increased. Details did not.",
    "The situation evolved. The summary will now try.",
];

const CATCHUP_CLOSERS: &[&str] = &[
    "Next steps were implied, not assigned.",
    "Consensus remained theoretical.",
    "Acknowledgement pending.",
    "Documentation exceeded follow-through.",
    "Resolution remained aspirational.",
    "Ownership was distributed. Accountability was not detected.",
    "This concludes the exhibit.",
    "Implementation remained politely out of frame.",
    "The timeline remained interpretive.",
    "Further clarity is available upon request.",
    "The record is complete. The situation is not.",
    "No individuals were harmed in the making of this report.",
];

const SMALL_NUMBERS: [&str; 13] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve",
];

/// Phrase pools with independent anti-repeat memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplatePool {
    SummaryOpener,
    CatchupOpener,
    CatchupCloser,
}

impl TemplatePool {
    pub fn phrases(self) -> &'static [&'static str] {
        match self {
            TemplatePool::SummaryOpener => SUMMARY_OPENERS,
            TemplatePool::CatchupOpener => CATCHUP_OPENERS,
            TemplatePool::CatchupCloser => CATCHUP_CLOSERS,
        }
    }
}

/// Last phrase chosen from each pool for one conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateMemory {
    last_index_by_pool: HashMap<TemplatePool, usize>,
}

impl TemplateMemory {
    pub fn last_index(&self, pool: TemplatePool) -> Option<usize> {
        self.last_index_by_pool.get(&pool).copied()
    }

    fn remember(&mut self, pool: TemplatePool, index: usize) {
        self.last_index_by_pool.insert(pool, index);
    }
}

/// Incremental digest flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestKind {
    Summary,
    Catchup,
}

/// Read-only views over the recent window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// Tone and texture of the conversation.
    Observe,
    /// Whether the latest question got an answer.
    Silence,
}

/// Draw an index in `0..len`, redrawing up to `attempts` times while it
/// equals `last`. The final draw is accepted even if it repeats.
pub fn pick_index(
    len: usize,
    last: Option<usize>,
    attempts: usize,
    source: &mut dyn IndexSource,
) -> usize {
    let len = len.max(1);
    let mut index = source.next_index(len).min(len - 1);
    for _ in 0..attempts {
        if Some(index) != last {
            break;
        }
        index = source.next_index(len).min(len - 1);
    }
    index
}

/// Spell 0 through 12 as words; larger numbers stay digits.
pub fn spell_small(n: usize) -> String {
    SMALL_NUMBERS
        .get(n)
        .map(|word| word.to_string())
        .unwrap_or_else(|| n.to_string())
}

/// Template renderer configured from [`RenderConfig`].
#[derive(Debug, Clone)]
pub struct Renderer {
    anti_repeat_attempts: usize,
    question_max_chars: usize,
}

impl Renderer {
    pub fn new(config: &RenderConfig) -> Self {
        Self {
            anti_repeat_attempts: config.anti_repeat_attempts,
            question_max_chars: config.question_max_chars,
        }
    }

    /// Render an incremental digest, updating the conversation's memory.
    ///
    /// An empty window renders [`EMPTY_WINDOW`] and leaves memory untouched.
    pub fn render(
        &self,
        signals: &Signals,
        memory: &mut TemplateMemory,
        kind: DigestKind,
        source: &mut dyn IndexSource,
    ) -> String {
        if signals.is_empty() {
            return EMPTY_WINDOW.to_string();
        }
        match kind {
            DigestKind::Summary => {
                let opener = self.pick(TemplatePool::SummaryOpener, memory, source);
                let mut lines = vec![opener.to_string()];
                lines.extend(body_lines(signals, "Context remained brave."));
                if !signals.representative_quote.is_empty() {
                    lines.push(format!(
                        "- Final entry logged: \"{}\"",
                        signals.representative_quote
                    ));
                }
                lines.join("\n")
            }
            DigestKind::Catchup => {
                let opener = self.pick(TemplatePool::CatchupOpener, memory, source);
                let closer = self.pick(TemplatePool::CatchupCloser, memory, source);
                let mut lines = vec![
                    opener.to_string(),
                    String::new(),
                    format!("- Volume: {} messages.", spell_small(signals.volume)),
                ];
                lines.extend(body_lines(signals, "Purpose unverified."));
                if !signals.representative_quote.is_empty() {
                    lines.push(format!("- Exhibit A: \"{}\"", signals.representative_quote));
                }
                lines.push(String::new());
                lines.push(closer.to_string());
                lines.join("\n")
            }
        }
    }

    /// Render a non-incremental view; no template memory is involved.
    pub fn render_view(&self, signals: &Signals, kind: ViewKind) -> String {
        if signals.is_empty() {
            return EMPTY_WINDOW.to_string();
        }
        let mut lines = vec![HEADER.to_string()];
        match kind {
            ViewKind::Observe => {
                let tone = match (signals.has_vibes, signals.has_logistics) {
                    (true, false) => "- Energy was present. Specifics were not.",
                    (true, true) => "- Both enthusiasm and logistics appeared.",
                    (false, true) => "- Logistics were discussed. Tone remained procedural.",
                    (false, false) => "- The thread proceeded without notable ornamentation.",
                };
                lines.push(tone.to_string());
                if signals.question_count > 0 {
                    lines.push(format!(
                        "- Questions detected: {}.",
                        spell_small(signals.question_count)
                    ));
                }
                if signals.short_count * 2 > signals.volume {
                    lines.push("- Brevity was favored.".to_string());
                }
                if signals.emoji_count > 0 {
                    lines.push("- Nonverbal signals were logged.".to_string());
                }
            }
            ViewKind::Silence => match &signals.last_question {
                None => lines.push("- No recent question detected.".to_string()),
                Some(question) => {
                    let status = if question.responded {
                        "A response followed."
                    } else {
                        "No response was detected."
                    };
                    lines.push(format!("- A question was asked. {status}"));
                    lines.push(format!(
                        "- Question noted: \"{}\"",
                        clip_chars(&question.text, self.question_max_chars)
                    ));
                }
            },
        }
        lines.join("\n")
    }

    fn pick(
        &self,
        pool: TemplatePool,
        memory: &mut TemplateMemory,
        source: &mut dyn IndexSource,
    ) -> &'static str {
        let phrases = pool.phrases();
        let index = pick_index(
            phrases.len(),
            memory.last_index(pool),
            self.anti_repeat_attempts,
            source,
        );
        memory.remember(pool, index);
        phrases[index]
    }
}

fn body_lines(signals: &Signals, link_remark: &str) -> Vec<String> {
    let mut lines = vec![
        format!("- Themes: {}.", signals.themes.join(", ")),
        format!("- Decisions: {}", decision_phrase(signals.decision)),
    ];
    if signals.link_count > 0 {
        lines.push(format!(
            "- Links: {} observed. {link_remark}",
            spell_small(signals.link_count)
        ));
    }
    if let Some(question) = &signals.last_question {
        let status = if question.responded {
            "Response recorded."
        } else {
            "Acknowledgement pending."
        };
        lines.push(format!("- A question was filed. {status}"));
    }
    lines
}

fn decision_phrase(decision: DecisionStatus) -> &'static str {
    match decision {
        DecisionStatus::Confirmed => "one was recorded.",
        DecisionStatus::Tentative => "tentative, with confidence.",
        DecisionStatus::None => "none confirmed.",
    }
}

#[cfg(test)]
mod tests {
    use super::{
        DigestKind, EMPTY_WINDOW, Renderer, TemplateMemory, TemplatePool, ViewKind, pick_index,
        spell_small,
    };
    use crate::classify::{DecisionStatus, QuestionOutcome, Signals};
    use crate::random::IndexSource;
    use archivist_config::RenderConfig;
    use pretty_assertions::assert_eq;

    struct Cycle {
        values: Vec<usize>,
        position: usize,
    }

    impl Cycle {
        fn new(values: &[usize]) -> Self {
            Self {
                values: values.to_vec(),
                position: 0,
            }
        }
    }

    impl IndexSource for Cycle {
        fn next_index(&mut self, _len: usize) -> usize {
            let value = self.values[self.position % self.values.len()];
            self.position += 1;
            value
        }
    }

    fn renderer() -> Renderer {
        Renderer::new(&RenderConfig::default())
    }

    fn dinner_signals() -> Signals {
        Signals {
            themes: vec!["scheduling".to_string(), "humor".to_string()],
            decision: DecisionStatus::Tentative,
            last_question: Some(QuestionOutcome {
                text: "can we do dinner tomorrow?".to_string(),
                responded: true,
            }),
            link_count: 0,
            representative_quote: "lol ok".to_string(),
            volume: 3,
            question_count: 1,
            short_count: 1,
            emoji_count: 0,
            has_logistics: false,
            has_vibes: true,
        }
    }

    fn empty_signals() -> Signals {
        Signals {
            themes: vec!["general discourse".to_string()],
            decision: DecisionStatus::None,
            last_question: None,
            link_count: 0,
            representative_quote: String::new(),
            volume: 0,
            question_count: 0,
            short_count: 0,
            emoji_count: 0,
            has_logistics: false,
            has_vibes: false,
        }
    }

    #[test]
    fn small_numbers_are_spelled() {
        assert_eq!(spell_small(0), "zero");
        assert_eq!(spell_small(12), "twelve");
        assert_eq!(spell_small(13), "13");
    }

    #[test]
    fn pick_index_redraws_on_repeat() {
        let mut source = Cycle::new(&[3, 3, 1]);
        assert_eq!(pick_index(6, Some(3), 6, &mut source), 1);
    }

    #[test]
    fn pick_index_accepts_repeat_after_attempts() {
        let mut source = Cycle::new(&[2]);
        assert_eq!(pick_index(6, Some(2), 6, &mut source), 2);
        assert_eq!(source.position, 7);
    }

    #[test]
    fn pick_index_clamps_out_of_range_draws() {
        let mut source = Cycle::new(&[99]);
        assert_eq!(pick_index(6, None, 6, &mut source), 5);
    }

    #[test]
    fn summary_layout() {
        let mut memory = TemplateMemory::default();
        let mut source = Cycle::new(&[2]);
        let text = renderer().render(&dinner_signals(), &mut memory, DigestKind::Summary, &mut source);
        assert_eq!(
            text,
            "Archivist files the following:\n\
             - Themes: scheduling, humor.\n\
             - Decisions: tentative, with confidence.\n\
             - A question was filed. Response recorded.\n\
             - Final entry logged: \"lol ok\""
        );
        assert_eq!(memory.last_index(TemplatePool::SummaryOpener), Some(2));
    }

    #[test]
    fn catchup_layout() {
        let mut signals = dinner_signals();
        signals.link_count = 2;
        signals.decision = DecisionStatus::Confirmed;
        signals.last_question = None;
        let mut memory = TemplateMemory::default();
        let mut source = Cycle::new(&[0, 6]);
        let text = renderer().render(&signals, &mut memory, DigestKind::Catchup, &mut source);
        assert_eq!(
            text,
            "Activity occurred. Clarity attended intermittently.\n\
             \n\
             - Volume: three messages.\n\
             - Themes: scheduling, humor.\n\
             - Decisions: one was recorded.\n\
             - Links: two observed. Purpose unverified.\n\
             - Exhibit A: \"lol ok\"\n\
             \n\
             This concludes the exhibit."
        );
        assert_eq!(memory.last_index(TemplatePool::CatchupOpener), Some(0));
        assert_eq!(memory.last_index(TemplatePool::CatchupCloser), Some(6));
    }

    #[test]
    fn empty_window_leaves_memory_untouched() {
        let mut memory = TemplateMemory::default();
        let mut source = Cycle::new(&[1]);
        let text = renderer().render(&empty_signals(), &mut memory, DigestKind::Catchup, &mut source);
        assert_eq!(text, EMPTY_WINDOW);
        assert_eq!(memory, TemplateMemory::default());
        assert_eq!(renderer().render_view(&empty_signals(), ViewKind::Silence), EMPTY_WINDOW);
    }

    #[test]
    fn consecutive_openers_differ() {
        let mut memory = TemplateMemory::default();
        let mut source = Cycle::new(&[4, 4, 4, 0]);
        let renderer = renderer();
        let first = renderer.render(&dinner_signals(), &mut memory, DigestKind::Summary, &mut source);
        let second = renderer.render(&dinner_signals(), &mut memory, DigestKind::Summary, &mut source);
        assert!(first.starts_with("Archivist notes, without enthusiasm:"));
        assert!(second.starts_with("Archivist observes:"));
    }

    #[test]
    fn observe_view() {
        let mut signals = dinner_signals();
        signals.has_logistics = true;
        signals.short_count = 2;
        signals.emoji_count = 1;
        assert_eq!(
            renderer().render_view(&signals, ViewKind::Observe),
            "Archivist observes:\n\
             - Both enthusiasm and logistics appeared.\n\
             - Questions detected: one.\n\
             - Brevity was favored.\n\
             - Nonverbal signals were logged."
        );
    }

    #[test]
    fn silence_view() {
        let mut signals = dinner_signals();
        assert_eq!(
            renderer().render_view(&signals, ViewKind::Silence),
            "Archivist observes:\n\
             - A question was asked. A response followed.\n\
             - Question noted: \"can we do dinner tomorrow?\""
        );
        signals.last_question = None;
        assert_eq!(
            renderer().render_view(&signals, ViewKind::Silence),
            "Archivist observes:\n- No recent question detected."
        );
    }
}
