//! Heuristic labelling of a window of messages.
//!
//! Theme buckets and phrase patterns are data (see [`tables`]); a single
//! scorer consumes them. Classification is pure and deterministic.

pub mod tables;

use crate::error::DigestError;
use archivist_archive::clip_chars;
use regex::{Regex, RegexSet, RegexSetBuilder};
use std::collections::{HashMap, HashSet};
use tables::{
    GENERAL_DISCOURSE, HARD_DECISION_PATTERNS, LOGISTICS_PATTERN, QUESTION_LEAD_PATTERN,
    SELF_REFERENCE, SOFT_DECISION_PATTERNS, STOP_WORDS, THEME_BUCKETS, ThemeBucket,
    VIBES_PATTERN,
};

const MAX_THEMES: usize = 4;
const MAX_FALLBACK_THEMES: usize = 3;
const MIN_FALLBACK_TOKEN_CHARS: usize = 3;
const SHORT_MESSAGE_CHARS: usize = 12;

/// How firmly the window settled on something.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionStatus {
    Confirmed,
    Tentative,
    None,
}

/// Most recent question in a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionOutcome {
    pub text: String,
    /// A later non-question message followed it.
    pub responded: bool,
}

/// Everything the renderer needs to know about a window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signals {
    pub themes: Vec<String>,
    pub decision: DecisionStatus,
    pub last_question: Option<QuestionOutcome>,
    /// Messages containing the link marker.
    pub link_count: usize,
    pub representative_quote: String,
    /// Non-empty, non-command messages considered.
    pub volume: usize,
    pub question_count: usize,
    pub short_count: usize,
    pub emoji_count: usize,
    pub has_logistics: bool,
    pub has_vibes: bool,
}

impl Signals {
    pub fn is_empty(&self) -> bool {
        self.volume == 0
    }
}

/// Compiled classifier over the default tables.
#[derive(Debug, Clone)]
pub struct Classifier {
    buckets: &'static [ThemeBucket],
    stop_words: HashSet<&'static str>,
    hard_decisions: RegexSet,
    soft_decisions: RegexSet,
    question_lead: Regex,
    logistics: Regex,
    vibes: Regex,
    link_marker: String,
    quote_max_chars: usize,
}

impl Classifier {
    pub fn new(link_marker: impl Into<String>, quote_max_chars: usize) -> Result<Self, DigestError> {
        Ok(Self {
            buckets: THEME_BUCKETS,
            stop_words: STOP_WORDS.iter().copied().collect(),
            hard_decisions: pattern_set(HARD_DECISION_PATTERNS)?,
            soft_decisions: pattern_set(SOFT_DECISION_PATTERNS)?,
            question_lead: pattern(QUESTION_LEAD_PATTERN)?,
            logistics: pattern(LOGISTICS_PATTERN)?,
            vibes: pattern(VIBES_PATTERN)?,
            link_marker: link_marker.into(),
            quote_max_chars,
        })
    }

    /// Label a window of already-redacted texts, oldest first. Callers drop
    /// command records beforehand; every text here counts as content.
    pub fn classify(&self, texts: &[String]) -> Signals {
        let texts: Vec<&str> = texts
            .iter()
            .map(|text| text.trim())
            .filter(|text| !text.is_empty())
            .collect();
        let joined = texts.join(" ").to_lowercase();

        let mut question_count = 0;
        let mut short_count = 0;
        let mut emoji_count = 0;
        let mut link_count = 0;
        for text in &texts {
            if self.is_question(text) {
                question_count += 1;
            }
            if text.chars().count() <= SHORT_MESSAGE_CHARS {
                short_count += 1;
            }
            if contains_pictograph(text) {
                emoji_count += 1;
            }
            if !self.link_marker.is_empty() && text.contains(self.link_marker.as_str()) {
                link_count += 1;
            }
        }

        Signals {
            themes: self.themes(&joined),
            decision: self.decision(&joined),
            last_question: self.last_question(&texts),
            link_count,
            representative_quote: texts
                .last()
                .map(|text| clip_chars(text, self.quote_max_chars))
                .unwrap_or_default(),
            volume: texts.len(),
            question_count,
            short_count,
            emoji_count,
            has_logistics: self.logistics.is_match(&joined),
            has_vibes: emoji_count > 0 || self.vibes.is_match(&joined),
        }
    }

    /// Whether a single message reads as a question.
    pub fn is_question(&self, text: &str) -> bool {
        text.contains('?') || self.question_lead.is_match(&text.trim().to_lowercase())
    }

    fn themes(&self, joined: &str) -> Vec<String> {
        let tokens: Vec<&str> = tokenize(joined)
            .into_iter()
            .filter(|token| !self.stop_words.contains(*token))
            .collect();
        if tokens.is_empty() {
            return vec![GENERAL_DISCOURSE.to_string()];
        }

        let mut scored: Vec<(usize, &ThemeBucket)> = self
            .buckets
            .iter()
            .map(|bucket| (score_bucket(bucket, &tokens), bucket))
            .filter(|(score, bucket)| *score >= bucket.min_hits.max(1))
            .collect();
        // Stable sort keeps table order on ties.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        if !scored.is_empty() {
            return scored
                .into_iter()
                .take(MAX_THEMES)
                .map(|(_, bucket)| bucket.label.to_string())
                .collect();
        }

        let fallback = frequent_tokens(&tokens);
        if fallback.is_empty() {
            vec![GENERAL_DISCOURSE.to_string()]
        } else {
            fallback
        }
    }

    fn decision(&self, joined: &str) -> DecisionStatus {
        if self.hard_decisions.is_match(joined) {
            DecisionStatus::Confirmed
        } else if self.soft_decisions.is_match(joined) {
            DecisionStatus::Tentative
        } else {
            DecisionStatus::None
        }
    }

    fn last_question(&self, texts: &[&str]) -> Option<QuestionOutcome> {
        let position = texts.iter().rposition(|text| self.is_question(text))?;
        let responded = texts[position + 1..]
            .iter()
            .any(|text| !self.is_question(text));
        Some(QuestionOutcome {
            text: texts[position].to_string(),
            responded,
        })
    }
}

/// Lower-case tokens of `[a-z0-9$]`, everything else acting as a separator.
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(|ch: char| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '$'))
        .filter(|token| !token.is_empty())
        .collect()
}

fn score_bucket(bucket: &ThemeBucket, tokens: &[&str]) -> usize {
    tokens
        .iter()
        .filter(|token| bucket.keywords.iter().any(|keyword| token.contains(keyword)))
        .count()
}

fn frequent_tokens(tokens: &[&str]) -> Vec<String> {
    let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
    for (position, token) in tokens.iter().enumerate() {
        if token.chars().count() < MIN_FALLBACK_TOKEN_CHARS || *token == SELF_REFERENCE {
            continue;
        }
        counts.entry(*token).or_insert((0, position)).0 += 1;
    }
    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(token, (count, first))| (token, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));
    ranked
        .into_iter()
        .take(MAX_FALLBACK_THEMES)
        .map(|(token, _, _)| token.to_string())
        .collect()
}

fn contains_pictograph(text: &str) -> bool {
    text.chars()
        .any(|ch| ('\u{1F300}'..='\u{1FAFF}').contains(&ch))
}

pub(crate) fn pattern(source: &str) -> Result<Regex, DigestError> {
    Regex::new(&format!("(?i){source}")).map_err(|err| DigestError::Setup(err.to_string()))
}

pub(crate) fn pattern_set(sources: &[&str]) -> Result<RegexSet, DigestError> {
    RegexSetBuilder::new(sources)
        .case_insensitive(true)
        .build()
        .map_err(|err| DigestError::Setup(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::{Classifier, DecisionStatus, QuestionOutcome, tokenize};
    use pretty_assertions::assert_eq;

    fn classifier() -> Classifier {
        Classifier::new("[link]", 120).expect("classifier")
    }

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|item| item.to_string()).collect()
    }

    #[test]
    fn dinner_plans_are_tentative_scheduling() {
        let signals = classifier().classify(&texts(&[
            "can we do dinner tomorrow?",
            "yeah let's do 7pm",
            "lol ok",
        ]));
        assert_eq!(signals.themes, vec!["scheduling", "humor"]);
        assert_eq!(signals.decision, DecisionStatus::Tentative);
        assert_eq!(
            signals.last_question,
            Some(QuestionOutcome {
                text: "can we do dinner tomorrow?".to_string(),
                responded: true,
            })
        );
        assert_eq!(signals.representative_quote, "lol ok");
        assert_eq!(signals.volume, 3);
        assert!(signals.has_vibes);
    }

    #[test]
    fn hard_language_wins_over_soft() {
        let signals = classifier().classify(&texts(&["we should ship", "ok, ship it"]));
        assert_eq!(signals.decision, DecisionStatus::Confirmed);
    }

    #[test]
    fn plain_chatter_has_no_decision() {
        let signals = classifier().classify(&texts(&["the weather turned cold"]));
        assert_eq!(signals.decision, DecisionStatus::None);
    }

    #[test]
    fn venting_needs_two_hits() {
        let one = classifier().classify(&texts(&["ugh"]));
        assert!(!one.themes.contains(&"venting".to_string()));
        let two = classifier().classify(&texts(&["ugh", "so frustrated"]));
        assert!(two.themes.contains(&"venting".to_string()));
    }

    #[test]
    fn themes_are_capped_and_ordered_by_score() {
        let signals = classifier().classify(&texts(&[
            "lol haha funny meme",
            "git commit then push",
            "gym workout",
            "keto meal",
            "dallas houston",
        ]));
        assert_eq!(signals.themes.len(), 4);
        assert_eq!(signals.themes[0], "humor");
        assert_eq!(signals.themes[1], "git");
    }

    #[test]
    fn fallback_uses_frequent_tokens() {
        let signals = classifier().classify(&texts(&[
            "archivist archivist zebra",
            "zebra quokka",
            "ox",
        ]));
        assert_eq!(signals.themes, vec!["zebra", "quokka"]);
    }

    #[test]
    fn empty_window_is_general_discourse() {
        let signals = classifier().classify(&[]);
        assert_eq!(signals.themes, vec!["general discourse"]);
        assert!(signals.is_empty());
        assert_eq!(signals.representative_quote, "");
        assert_eq!(signals.last_question, None);
    }

    #[test]
    fn slash_leading_content_is_counted() {
        let signals = classifier().classify(&texts(&["  ", "/usr/bin is where it lives"]));
        assert_eq!(signals.volume, 1);
        assert_eq!(signals.representative_quote, "/usr/bin is where it lives");
    }

    #[test]
    fn unanswered_question_is_pending() {
        let signals = classifier().classify(&texts(&["ok", "where are we meeting"]));
        assert_eq!(
            signals.last_question,
            Some(QuestionOutcome {
                text: "where are we meeting".to_string(),
                responded: false,
            })
        );
        assert_eq!(signals.question_count, 1);
    }

    #[test]
    fn link_marker_and_pictographs_are_counted() {
        let signals = classifier().classify(&texts(&["see [link]", "nice \u{1F389}", "plain text here"]));
        assert_eq!(signals.link_count, 1);
        assert_eq!(signals.emoji_count, 1);
        assert_eq!(signals.short_count, 2);
    }

    #[test]
    fn quote_is_clipped() {
        let long = "word ".repeat(60);
        let signals = classifier().classify(&texts(&[long.as_str()]));
        assert_eq!(signals.representative_quote.chars().count(), 120);
        assert!(signals.representative_quote.ends_with('…'));
    }

    #[test]
    fn classification_is_deterministic() {
        let input = texts(&["deploy to prod tonight", "we decided", "cost is $5"]);
        let classifier = classifier();
        assert_eq!(classifier.classify(&input), classifier.classify(&input));
    }

    #[test]
    fn tokenizer_keeps_dollar_and_digits() {
        assert_eq!(tokenize("pay $5, at 7pm!"), vec!["pay", "$5", "at", "7pm"]);
    }
}
